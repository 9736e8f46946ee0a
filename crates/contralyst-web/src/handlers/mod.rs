//! HTTP handlers for all API routes.

pub mod analyzer;
pub mod licensors;
pub mod system;
pub mod terms;
