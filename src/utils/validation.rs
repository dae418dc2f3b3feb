use validator::ValidationError;

/// Digits with an optional leading `+`, 7 to 15 digits long.
pub fn validate_mobile(mobile: &str) -> std::result::Result<(), ValidationError> {
    let digits = mobile.strip_prefix('+').unwrap_or(mobile);
    if (7..=15).contains(&digits.len()) && digits.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        Err(ValidationError::new("mobile"))
    }
}

pub fn validate_skills(skills: &[String]) -> std::result::Result<(), ValidationError> {
    if skills.iter().any(|s| s.trim().is_empty() || s.len() > 64) {
        return Err(ValidationError::new("skills"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mobile_format() {
        assert!(validate_mobile("+998901234567").is_ok());
        assert!(validate_mobile("5551234").is_ok());
        assert!(validate_mobile("12-34").is_err());
        assert!(validate_mobile("+12").is_err());
    }

    #[test]
    fn blank_skills_are_rejected() {
        assert!(validate_skills(&["rust".into(), "sql".into()]).is_ok());
        assert!(validate_skills(&["rust".into(), "  ".into()]).is_err());
    }
}
