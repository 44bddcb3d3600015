//! Registration errors.

use thiserror::Error;
use trellis_router::PatternError;

/// Errors returned when a route cannot be registered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    /// The pattern did not parse.
    #[error(transparent)]
    Pattern(#[from] PatternError),

    /// A route was registered with an empty method list.
    #[error("no methods given for `{0}`")]
    NoMethods(String),
}
