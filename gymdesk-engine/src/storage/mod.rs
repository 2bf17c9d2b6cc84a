//! Storage layer for gymdesk record files
//!
//! This module handles the flat binary format of the desk's files:
//! - Byte queue used to stage one record
//! - Record framing (length prefixes, strings, fixed-size fields)
//! - Sequential record file I/O

pub mod fifo;
pub mod codec;
pub mod files;

pub use fifo::Fifo;
pub use codec::{Codec, LEN_PREFIX};
pub use files::{OpenMode, Origin, RecordFile, MAX_RECORD_LEN};
