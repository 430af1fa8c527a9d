//! Result type alias for KATA mapping operations

use crate::error::KataError;

/// Standard Result type for KATA mapping operations
pub type Result<T> = std::result::Result<T, KataError>;
