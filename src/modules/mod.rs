//! Modules layer - Infrastructure components
//!
//! Contains adapters that are not tied to a single feature, currently the
//! local file storage and export machinery.

pub mod storage;
