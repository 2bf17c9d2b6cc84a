//! Subscription packs
//!
//! Record layout: `name:str  duration:i32  cost:f64`

use std::cmp::Ordering;
use std::io::{self, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use super::check_text;
use crate::collection::Record;
use crate::error::{DeskError, DeskResult};
use crate::storage::codec::{field, get_str, put_str, str_len};
use crate::storage::{Codec, Fifo};

/// A subscription offer, keyed by name
#[derive(Debug, Clone, PartialEq)]
pub struct Pack {
    pub name: String,
    /// Months
    pub duration: i32,
    pub cost: f64,
}

impl Pack {
    pub fn new(name: &str, duration: i32, cost: f64) -> DeskResult<Self> {
        check_text("name", name)?;
        if duration < 1 {
            return Err(DeskError::InvalidValue(format!(
                "duration of {} months",
                duration
            )));
        }
        if cost.is_nan() || cost < 0.0 {
            return Err(DeskError::InvalidValue(format!("cost {}", cost)));
        }

        Ok(Pack {
            name: name.to_string(),
            duration,
            cost,
        })
    }

    pub fn probe(name: &str) -> Self {
        Pack {
            name: name.to_string(),
            ..Pack::construct()
        }
    }
}

impl Record for Pack {
    fn construct() -> Self {
        Pack {
            name: String::new(),
            duration: 1,
            cost: 5.0,
        }
    }

    fn compare(&self, other: &Self) -> Ordering {
        self.name.cmp(&other.name)
    }

    fn print(&self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "--------------PACK INFO--------------")?;
        writeln!(out, "Name: {}", self.name)?;
        writeln!(out, "Duration [months]: {}", self.duration)?;
        writeln!(out, "Cost [EUR]: {:.2}", self.cost)?;
        writeln!(out, "-------------------------------------\n")
    }

    fn print_line(&self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "{}, {}, {:.2}", self.name, self.duration, self.cost)
    }
}

impl Codec for Pack {
    fn encoded_len(&self) -> usize {
        str_len(&self.name) + 4 + 8
    }

    fn encode(&self, fifo: &mut Fifo) -> DeskResult<()> {
        put_str(fifo, &self.name)?;
        fifo.write_i32::<LittleEndian>(self.duration)?;
        fifo.write_f64::<LittleEndian>(self.cost)?;
        Ok(())
    }

    fn decode(fifo: &mut Fifo) -> DeskResult<Self> {
        Ok(Pack {
            name: get_str(fifo)?,
            duration: field(fifo.read_i32::<LittleEndian>(), "duration")?,
            cost: field(fifo.read_f64::<LittleEndian>(), "cost")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_validates() {
        assert!(Pack::new("gold", 12, 300.0).is_ok());
        assert!(Pack::new("", 12, 300.0).is_err());
        assert!(Pack::new("gold", 0, 300.0).is_err());
        assert!(Pack::new("gold", 1, -1.0).is_err());
        assert!(Pack::new("gold", 1, f64::NAN).is_err());
    }

    #[test]
    fn test_defaults() {
        let pack = Pack::construct();
        assert_eq!(pack.duration, 1);
        assert_eq!(pack.cost, 5.0);
    }

    #[test]
    fn test_record_layout() {
        let pack = Pack::new("silver", 6, 149.9).unwrap();
        let fifo = pack.to_fifo().unwrap();
        let bytes = fifo.as_bytes();
        assert_eq!(bytes.len(), 8 + 7 + 4 + 8);
        assert_eq!(&bytes[..8], &7u64.to_le_bytes());
        assert_eq!(&bytes[8..15], b"silver\0");
        assert_eq!(&bytes[15..19], &6i32.to_le_bytes());
        assert_eq!(&bytes[19..], &149.9f64.to_le_bytes());

        let mut reader = Fifo::from_bytes(bytes.to_vec());
        assert_eq!(Pack::decode(&mut reader).unwrap(), pack);
    }

    #[test]
    fn test_compare_is_case_sensitive() {
        assert_eq!(Pack::probe("Gold").compare(&Pack::probe("gold")), Ordering::Less);
        assert_eq!(Pack::probe("gold").compare(&Pack::probe("gold")), Ordering::Equal);
    }

    #[test]
    fn test_print_line() {
        let mut out = Vec::new();
        Pack::new("gold", 12, 300.0).unwrap().print_line(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "gold, 12, 300.00\n");
    }
}
