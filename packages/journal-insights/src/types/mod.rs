//! Domain types for journal analysis and retrieval.

pub mod analysis;
pub mod config;
pub mod document;
pub mod entry;
