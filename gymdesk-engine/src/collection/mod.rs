//! Ordered record container
//!
//! An [`OrderedList`] owns its records, keeps them sorted as they are
//! inserted and records whether anything changed since the last save.

pub mod arena;
pub mod behavior;
pub mod list;

pub use arena::Handle;
pub use behavior::{Compare, Direction, InsertFlags, Printer, Record};
pub use list::{print_header, Iter, OrderedList, Rejected};
