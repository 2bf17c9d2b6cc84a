//! Record capabilities required by the ordered list

use std::cmp::Ordering;
use std::io::{self, Write};

/// Comparator used to override a record's natural ordering
pub type Compare<T> = fn(&T, &T) -> Ordering;

/// Printer used to override a record's block printer
pub type Printer<T> = fn(&T, &mut dyn Write) -> io::Result<()>;

/// Operations an element type supplies to [`OrderedList`](super::OrderedList)
pub trait Record: Sized {
    /// Default-constructed record; also the starting point for search probes
    fn construct() -> Self;

    /// Natural (primary key) ordering
    fn compare(&self, other: &Self) -> Ordering;

    /// Release the record. Called by the list whenever it drops a record it
    /// owns (removal, duplicate update, clear).
    fn destroy(self) {}

    /// Block printer
    fn print(&self, out: &mut dyn Write) -> io::Result<()>;

    /// One-line printer for tables
    fn print_line(&self, out: &mut dyn Write) -> io::Result<()> {
        self.print(out)
    }
}

bitflags::bitflags! {
    /// Flags that modify sorted insertion
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct InsertFlags: u8 {
        /// Descending sort order
        const DESCENDING = 0x01;
        /// Equal keys update the existing record in place
        const DUPLICATES = 0x02;
    }
}

/// Active ordering direction of a list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Ascending,
    Descending,
}

impl Direction {
    /// Orient a comparison result
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Direction::Ascending => ordering,
            Direction::Descending => ordering.reverse(),
        }
    }
}

impl From<InsertFlags> for Direction {
    fn from(flags: InsertFlags) -> Self {
        if flags.contains(InsertFlags::DESCENDING) {
            Direction::Descending
        } else {
            Direction::Ascending
        }
    }
}
