//! Records kept by the desk
//!
//! Each entity implements [`Record`](crate::collection::Record) for the
//! ordered list and [`Codec`](crate::storage::Codec) for its record file.

pub mod user;
pub mod activity;
pub mod pack;

pub use user::{Sex, User, UserKind};
pub use activity::{week_minutes, Activity};
pub use pack::Pack;

use crate::error::{DeskError, DeskResult};

/// Reject empty text and text starting with whitespace
pub fn check_text(field: &str, value: &str) -> DeskResult<()> {
    match value.chars().next() {
        None => Err(DeskError::InvalidValue(format!("{} is empty", field))),
        Some(c) if c.is_whitespace() => Err(DeskError::InvalidValue(format!(
            "{} starts with whitespace",
            field
        ))),
        Some(_) => Ok(()),
    }
}
