//! HTTP handlers for all web routes.

pub mod dashboard;
pub mod targets;
pub mod candidates;
pub mod interactions;
pub mod upload;
pub mod viewer;
