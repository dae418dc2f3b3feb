use crate::error::{Error, Result};
use crate::models::application::StagePolicy;
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;
use std::sync::OnceLock;

const DEFAULT_SCORING_URL: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_SCORING_MODEL: &str = "gpt-4o-mini";

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub database_url: String,
    pub db_max_connections: u32,
    pub jwt_secret: String,
    /// Absent means issued tokens never expire.
    pub token_ttl_seconds: Option<i64>,
    pub stage_policy: StagePolicy,
    pub uploads_dir: String,
    /// Present only when `SCORING_API_KEY` is set.
    pub scoring: Option<ScoringConfig>,
    pub json_logs: bool,
}

#[derive(Debug, Clone)]
pub struct ScoringConfig {
    pub api_key: String,
    pub api_url: String,
    pub model: String,
}

static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let scoring = optional("SCORING_API_KEY").map(|api_key| ScoringConfig {
            api_key,
            api_url: optional("SCORING_API_URL").unwrap_or_else(|| DEFAULT_SCORING_URL.into()),
            model: optional("SCORING_MODEL").unwrap_or_else(|| DEFAULT_SCORING_MODEL.into()),
        });

        Ok(Self {
            server_address: required("SERVER_ADDRESS")?,
            database_url: required("DATABASE_URL")?,
            db_max_connections: parsed("DB_MAX_CONNECTIONS")?.unwrap_or(20),
            jwt_secret: required("JWT_SECRET")?,
            token_ttl_seconds: parsed("TOKEN_TTL_SECONDS")?,
            stage_policy: parsed("STAGE_TRANSITIONS")?.unwrap_or_default(),
            uploads_dir: optional("UPLOADS_DIR").unwrap_or_else(|| "./uploads".into()),
            scoring,
            json_logs: optional("LOG_FORMAT").is_some_and(|v| v.eq_ignore_ascii_case("json")),
        })
    }
}

/// Trimmed value of `name`; blank counts as unset.
fn optional(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|raw| raw.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required(name: &str) -> Result<String> {
    optional(name).ok_or_else(|| Error::Config(format!("{} must be set", name)))
}

fn parsed<T>(name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    optional(name)
        .map(|raw| {
            raw.parse()
                .map_err(|e| Error::Config(format!("{} is not valid: {}", name, e)))
        })
        .transpose()
}

pub fn init_config() -> Result<()> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("config initialized twice".to_string()))
}

pub fn get_config() -> Result<&'static Config> {
    CONFIG
        .get()
        .ok_or_else(|| Error::Config("config read before init_config".to_string()))
}
