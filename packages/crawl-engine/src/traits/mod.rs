//! Core trait abstractions for the crawl engine.
//!
//! These traits are the seams between the engine and its collaborators:
//! network access, persistence and classification.

pub mod classifier;
pub mod fetcher;
pub mod store;
