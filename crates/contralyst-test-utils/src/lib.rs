//! Shared test fixtures for Contralyst crates.

pub mod fixtures;
