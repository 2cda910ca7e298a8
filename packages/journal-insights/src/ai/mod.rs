//! Hosted model implementations of the AI traits.
//!
//! This module provides a reference implementation of [`TextGenerator`] and
//! [`Embedder`] backed by OpenAI. Applications can use it directly or plug in
//! their own provider.
//!
//! [`TextGenerator`]: crate::traits::ai::TextGenerator
//! [`Embedder`]: crate::traits::ai::Embedder

mod openai;

pub use openai::OpenAI;
