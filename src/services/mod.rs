pub mod application_service;
pub mod audit_service;
pub mod credential_service;
pub mod fitment_service;
pub mod job_service;
pub mod lifecycle_service;
pub mod organization_service;
pub mod report_service;
pub mod resume_service;
pub mod token_service;
