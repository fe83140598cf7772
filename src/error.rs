//! Unified error type used across the crate.
//!
//! Per the engine's "best-effort, skip-unknown" policy, almost nothing in
//! the analysis itself returns `Result` — non-foldable constants,
//! unrecognized selectors, and non-struct bind operands are silent skips.
//! `AppError` exists for the one genuinely programmer-visible condition:
//! an unsupported type reaching schema lowering. `schema::SchemaRegistry`
//! returns it from `to_schema_ref`/`lower_kind`; callers further out still
//! treat it as a skip, logging it via `tracing::warn!` rather than
//! propagating it past the analyzer.

use derive_more::{Display, From};

/// The crate-wide error enum.
#[derive(Debug, Display, From, PartialEq, Eq)]
pub enum AppError {
    /// A type reached schema lowering that the registry has no rule for.
    #[display("unsupported type during schema lowering: {_0}")]
    #[from(ignore)]
    UnsupportedType(String),

    /// Generic, catch-all error for malformed caller input (e.g. an empty
    /// package graph where an entry package was required).
    #[display("{_0}")]
    General(String),
}

impl std::error::Error for AppError {}

/// Convenience alias used throughout the crate.
pub type AppResult<T> = Result<T, AppError>;
