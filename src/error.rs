//! Error types.
//!
//! Only construction-time conditions are errors. Missing keys and duplicate
//! inserts are ordinary outcomes reported through `Option`/`bool`, and
//! strategy contract violations are not detected at all.

use thiserror::Error;

/// `try_insert` found a key the strategy considers equal (or `Equal`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InsertError {
    #[error("duplicate key under the container's strategy")]
    DuplicateKey,
}

/// No strategy could be resolved for the requested key type or name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StrategyResolutionError {
    #[error("`{type_name}` has no natural order and no structural fallback")]
    NoNaturalOrder { type_name: &'static str },
    #[error("no strategy registered under `{name}`")]
    Unregistered { name: String },
}

/// A named strategy exists but compares a different key type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("strategy `{name}` compares `{found}` keys but the container's key type is `{expected}`")]
pub struct TypeMismatchError {
    pub name: String,
    pub expected: &'static str,
    pub found: &'static str,
}

/// `Tolerance` needs a finite, positive epsilon.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("tolerance must be finite and positive, got {epsilon}")]
pub struct InvalidToleranceError {
    pub epsilon: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StrategyError {
    #[error(transparent)]
    Resolution(#[from] StrategyResolutionError),
    #[error(transparent)]
    TypeMismatch(#[from] TypeMismatchError),
}
