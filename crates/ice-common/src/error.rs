//! Errors raised when parsing user supplied identifiers.

use thiserror::Error;

/// An identifier outside one of the fixed enumerations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Unknown glacier '{0}': must be either jakobshavn, helheim or kangerd")]
    UnknownGlacier(String),

    #[error("Unrecognized DEM source {0}, should be either \"cresis\" or \"morlighem\"")]
    UnknownDemSource(String),
}
