//! contralyst-common: Shared types and errors used across all Contralyst crates.

pub mod error;
pub mod extraction;
pub mod licensors;

// Re-export commonly used types
pub use error::{ApiError, ContralystError};
pub use extraction::{ExtractionResult, PerUserFee, ReportField, ResultSource};
pub use licensors::{Licensor, default_licensors};
