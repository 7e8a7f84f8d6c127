//! Core service layer modules

pub mod alternatives;
pub mod duplicate_check;
pub mod loader;
pub mod service;
pub mod similarity;

// Re-export main types for convenience
pub use alternatives::{is_structured_code, suggest_alternatives, DEFAULT_MAX_SUGGESTIONS};
pub use duplicate_check::{
    CheckOptions, CheckStatus, CheckSummary, CodeCheckResult, DuplicateCheckReport,
    DuplicateCheckRequest, DuplicateChecker, NameCheckResult, SimilarMatch, SingleCodeResult,
    MAX_SIMILAR_MATCHES, SIMILARITY_THRESHOLD,
};
pub use loader::{load_existing, ExistingRecord, UNKNOWN_ATTRIBUTE};
pub use service::*;
pub use similarity::{normalize, similarity};
