//! Periodic ad slot refreshing for pages served with DFP ad tags.
//!
//! The browser side parses the per-slot refresh settings once per page load
//! and arms one recurring timer per enabled, rendered slot. The server side
//! [`AttachmentGate`](services::gate::AttachmentGate) decides whether the
//! library ships on a response at all.

pub mod behavior;
pub mod config;
pub mod models;
pub mod services;
pub mod utils;
