//! Post-extraction comment processing
//!
//! After the parsers have produced raw comment records, the pipeline picks
//! between the two renditions of a thread ([`reconcile`]), then fills
//! defaults, canonicalizes timestamps, and removes duplicates ([`dedupe`]).

pub mod dedupe;
pub mod reconcile;

pub use dedupe::process_comments;
pub use reconcile::choose_comments;
