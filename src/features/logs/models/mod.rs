mod log;

pub use log::LogRow;
