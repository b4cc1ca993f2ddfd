//! Multi-source fusion.
//!
//! Predictions are pooled in arrival order, deduplicated, then ranked:
//!
//! 1. **detector** adapter (priority 1)
//! 2. **backend** adapter (priority 2, alternatives 3)
//! 3. **semantic** label from the backend description (priority 2)
//! 4. **classifier** adapter, validity-filtered and redundancy-checked
//!    against everything pooled so far (priority 4)
//! 5. **dedup**: first seen wins on normalized label
//! 6. **rank**: priority, confidence, arrival; truncated to `max_results`

pub mod dedup;
pub mod engine;
pub mod filter;
pub mod rank;
pub mod semantic;

pub use dedup::{deduplicate, normalize_label};
pub use engine::FusionEngine;
pub use filter::ValidityFilter;
pub use rank::rank;
pub use semantic::SemanticExtractor;
