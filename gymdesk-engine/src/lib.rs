//! gymdesk Engine - ordered record lists and flat record files
//!
//! This crate provides the storage substrate for the gymdesk backend:
//! a generic ordered container, a bounded byte queue used to stage record
//! bytes, the length-prefixed record framing, and the entity records kept
//! in those files.

pub mod error;
pub mod storage;
pub mod collection;
pub mod entities;
pub mod desk;

pub use error::{DeskError, DeskResult, StatusCode};
pub use collection::{Handle, InsertFlags, OrderedList, Record, Rejected};
pub use storage::{Codec, Fifo, RecordFile};
pub use entities::{Activity, Pack, Sex, User, UserKind};
pub use desk::{Desk, DeskPaths};
