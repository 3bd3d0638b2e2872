//! Crawl orchestration
//!
//! [`listing`] retrieves and filters the item listing, [`post`] extracts one
//! item end to end, and [`orchestrator`] drives the listing-mode run: pacing,
//! per-item failure isolation, progress reporting, and the final summary.

pub mod listing;
pub mod orchestrator;
pub mod post;

pub use orchestrator::Orchestrator;
pub use post::extract_post;
