//! gliotarget-web: Web dashboard for GlioTarget
//! Provides the aptamer explorer with:
//!   - EGFR target browser and detail view
//!   - Aptamer candidate browser, detail view and search
//!   - Interaction browser filtered by candidate or target
//!   - Structure viewer placeholder
//!   - Sidebar bulk loader for comma- or tab-separated data

pub mod config;
pub mod router;
pub mod handlers;
pub mod render;
pub mod state;
