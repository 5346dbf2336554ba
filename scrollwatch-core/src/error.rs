//! Error types surfaced by the registration path.
//!
//! Placement resolution is the only fallible step in the public API: a
//! malformed shorthand expression fails loudly at `add_viewport` time
//! instead of degrading into NaN thresholds that would never trigger.

use thiserror::Error;

/// Failure to resolve a placement expression into a canonical triple.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlacementError {
    /// The expression contained no terms.
    #[error("empty placement expression")]
    Empty,

    /// A term's numeric part did not parse.
    #[error("invalid number `{0}` in placement expression")]
    InvalidNumber(String),

    /// A term carried an unrecognized unit suffix.
    #[error("unknown unit `{unit}` in placement term `{term}` (expected `%`, `px`, `target`, or `%target`)")]
    UnknownUnit { term: String, unit: String },

    /// A dangling `+`/`-` with no term following it.
    #[error("trailing operator in placement expression `{0}`")]
    TrailingOperator(String),

    /// A numeric component was NaN or infinite.
    #[error("placement value `{0}` is not finite")]
    NonFinite(f64),
}
