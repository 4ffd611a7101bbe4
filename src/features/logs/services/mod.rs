mod log_service;

pub use log_service::LogService;
