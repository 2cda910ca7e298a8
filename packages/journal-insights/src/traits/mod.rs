//! Core trait abstractions for the journal insights engine.
//!
//! These traits define the boundaries applications implement to plug in
//! hosted models and embedding caches.

pub mod ai;
pub mod cache;
