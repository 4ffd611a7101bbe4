mod audit;

pub use audit::Audit;
