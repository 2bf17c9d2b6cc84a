//! Record framing
//!
//! Records are flat: fixed-size fields are written raw (little-endian, no
//! prefix) and every string is written as an 8-byte length followed by
//! the bytes and a NUL terminator, the length counting the terminator.
//! Field order is fixed per entity.

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use super::fifo::Fifo;
use crate::error::{DeskError, DeskResult};

/// Width of every length prefix (record length and string length)
pub const LEN_PREFIX: usize = 8;

/// A record that can be staged through a [`Fifo`]
pub trait Codec: Sized {
    /// Exact number of bytes `encode` pushes
    fn encoded_len(&self) -> usize;

    /// Push every field in declaration order
    fn encode(&self, fifo: &mut Fifo) -> DeskResult<()>;

    /// Pop every field in declaration order
    fn decode(fifo: &mut Fifo) -> DeskResult<Self>;

    /// Encode into a queue sized exactly for this record
    fn to_fifo(&self) -> DeskResult<Fifo> {
        let mut fifo = Fifo::with_capacity(self.encoded_len())?;
        self.encode(&mut fifo)?;
        let written = fifo.write_index();
        fifo.set_logical_size(written)?;
        Ok(fifo)
    }
}

/// Encoded size of a string field
pub fn str_len(value: &str) -> usize {
    LEN_PREFIX + value.len() + 1
}

/// Push a length-prefixed, NUL-terminated string
pub fn put_str(fifo: &mut Fifo, value: &str) -> DeskResult<()> {
    let len = value.len() + 1;
    fifo.write_u64::<LittleEndian>(len as u64)?;
    if !value.is_empty() {
        fifo.push(value.as_bytes())?;
    }
    fifo.push(&[0])?;
    Ok(())
}

/// Pop a length-prefixed, NUL-terminated string
pub fn get_str(fifo: &mut Fifo) -> DeskResult<String> {
    let len = get_len(fifo)?;
    if len == 0 {
        return Err(DeskError::InvalidFormat(
            "string length must include the terminator".into(),
        ));
    }
    if len > fifo.remaining() {
        return Err(DeskError::InvalidFormat(format!(
            "string of {} bytes with only {} left in record",
            len,
            fifo.remaining()
        )));
    }

    let mut bytes = vec![0u8; len];
    fifo.pop(&mut bytes)?;
    if bytes.pop() != Some(0) {
        return Err(DeskError::InvalidFormat("string is not NUL-terminated".into()));
    }

    String::from_utf8(bytes)
        .map_err(|e| DeskError::InvalidFormat(format!("string is not UTF-8: {}", e)))
}

/// Pop an 8-byte length prefix
pub fn get_len(fifo: &mut Fifo) -> DeskResult<usize> {
    let len = fifo
        .read_u64::<LittleEndian>()
        .map_err(|_| DeskError::InvalidFormat("truncated length prefix".into()))?;
    usize::try_from(len)
        .map_err(|_| DeskError::InvalidFormat(format!("length {} out of range", len)))
}

/// Map a short read on a fixed-size field to a format error
pub(crate) fn field<T>(result: std::io::Result<T>, name: &str) -> DeskResult<T> {
    result.map_err(|_| DeskError::InvalidFormat(format!("truncated field `{}`", name)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_layout() {
        let mut fifo = Fifo::with_capacity(str_len("ana")).unwrap();
        put_str(&mut fifo, "ana").unwrap();
        assert!(fifo.is_full());

        let bytes = fifo.written();
        assert_eq!(&bytes[..8], &4u64.to_le_bytes());
        assert_eq!(&bytes[8..], b"ana\0");
    }

    #[test]
    fn test_empty_string_keeps_terminator() {
        let mut fifo = Fifo::with_capacity(str_len("")).unwrap();
        put_str(&mut fifo, "").unwrap();
        assert_eq!(fifo.write_index(), 9);
        assert_eq!(get_str(&mut fifo).unwrap(), "");
    }

    #[test]
    fn test_short_queue_reports_queue_full() {
        use crate::error::StatusCode;

        let mut fifo = Fifo::with_capacity(4).unwrap();
        let err = put_str(&mut fifo, "ana").unwrap_err();
        assert_eq!(err.status_code(), StatusCode::QueueFull);
        assert_eq!(fifo.write_index(), 0);

        let mut fifo = Fifo::with_capacity(10).unwrap();
        let err = put_str(&mut fifo, "ana").unwrap_err();
        assert_eq!(err.status_code(), StatusCode::QueueFull);
        assert_eq!(fifo.write_index(), 8);
    }

    #[test]
    fn test_missing_terminator_is_rejected() {
        let mut raw = 3u64.to_le_bytes().to_vec();
        raw.extend_from_slice(b"abc");
        let mut fifo = Fifo::from_bytes(raw);
        assert!(matches!(get_str(&mut fifo), Err(DeskError::InvalidFormat(_))));
    }

    #[test]
    fn test_overlong_prefix_is_rejected() {
        let mut raw = 100u64.to_le_bytes().to_vec();
        raw.extend_from_slice(b"abc\0");
        let mut fifo = Fifo::from_bytes(raw);
        assert!(matches!(get_str(&mut fifo), Err(DeskError::InvalidFormat(_))));
    }

    #[test]
    fn test_short_prefix_is_rejected() {
        let mut fifo = Fifo::from_bytes(vec![1, 0, 0]);
        assert!(matches!(get_len(&mut fifo), Err(DeskError::InvalidFormat(_))));
    }

    #[test]
    fn test_push_of_oversized_string_fails() {
        let mut fifo = Fifo::with_capacity(10).unwrap();
        assert!(put_str(&mut fifo, "too long for it").is_err());
    }
}
