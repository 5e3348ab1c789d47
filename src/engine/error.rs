use crate::store::StoreError;
use derive_more::{Display, From};

/// Why an attendance operation was refused or failed.
#[derive(Debug, Display, From)]
pub enum AttendanceError {
    /// Bad or conflicting input; nothing was written.
    #[display(fmt = "{}", _0)]
    #[from(ignore)]
    Validation(String),
    /// Non-working or future date; nothing was written.
    #[display(fmt = "{}", _0)]
    #[from(ignore)]
    PolicyViolation(String),
    #[display(fmt = "{}", _0)]
    #[from(ignore)]
    NotFound(String),
    /// The store call failed; the in-memory view is unchanged.
    #[display(fmt = "{}", _0)]
    Persistence(StoreError),
}

impl std::error::Error for AttendanceError {}
