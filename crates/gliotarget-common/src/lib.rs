//! gliotarget-common: Shared types used across the GlioTarget crates.

pub mod error;

pub use error::ApiError;
