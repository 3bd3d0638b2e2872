//! Parsers for the discussion source
//!
//! Two parsers produce the same comment shape from structurally different
//! renditions of one thread:
//! - [`comments`] reconstructs the tree from rendered markup using ordered
//!   fallback selector chains
//! - [`api`] walks the structured JSON payload
//!
//! [`post`] extracts item metadata from the rendered page.

pub mod api;
pub mod comments;
pub mod post;
pub mod strategy;

pub use api::parse_json_comments;
pub use comments::parse_comments;
pub use post::parse_post_info;
