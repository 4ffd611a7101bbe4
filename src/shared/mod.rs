pub mod constants;
pub mod http;
pub mod test_helpers;
pub mod types;
pub mod validation;
