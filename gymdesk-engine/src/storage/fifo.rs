//! Bounded byte queue used to stage one record's bytes
//!
//! A `Fifo` is a plain byte array with independent read and write cursors.
//! It is not a ring buffer: a producer fills it with a sequence of pushes,
//! or a consumer drains it with a sequence of pops, and then it is dropped.
//!
//! Invariant: `0 <= rd <= wr <= size <= capacity`.

use std::io::{self, Read, Write};

use crate::error::{DeskError, DeskResult, StatusCode};

/// Fixed-capacity byte queue with separate read/write cursors
#[derive(Clone, PartialEq, Eq)]
pub struct Fifo {
    /// Read cursor
    rd: usize,
    /// Write cursor
    wr: usize,
    /// Logical size (starts at capacity, may be shrunk)
    size: usize,
    /// Backing buffer, zero-initialized
    data: Vec<u8>,
}

impl Fifo {
    /// Allocate a zeroed queue of `capacity` bytes
    pub fn with_capacity(capacity: usize) -> DeskResult<Self> {
        let mut data = Vec::new();
        data.try_reserve_exact(capacity)
            .map_err(|_| DeskError::Status(StatusCode::OutOfMemory))?;
        data.resize(capacity, 0);

        Ok(Fifo {
            rd: 0,
            wr: 0,
            size: capacity,
            data,
        })
    }

    /// Wrap bytes that were loaded from elsewhere; the whole buffer counts
    /// as written and is ready to be popped.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        let len = bytes.len();
        Fifo {
            rd: 0,
            wr: len,
            size: len,
            data: bytes,
        }
    }

    /// Check if the queue is full
    pub fn is_full(&self) -> bool {
        self.wr == self.size
    }

    /// Check if every written byte has been popped
    pub fn is_empty(&self) -> bool {
        self.wr == self.rd
    }

    /// Push `data` at the write cursor.
    ///
    /// The push is all-or-nothing: a push that does not fit is rejected
    /// and the bytes already in the queue are left untouched.
    pub fn push(&mut self, data: &[u8]) -> DeskResult<usize> {
        if data.is_empty() {
            return Err(StatusCode::InvalidLength.into());
        }
        if self.is_full() || data.len() > self.size - self.wr {
            return Err(StatusCode::QueueFull.into());
        }

        self.data[self.wr..self.wr + data.len()].copy_from_slice(data);
        self.wr += data.len();
        Ok(data.len())
    }

    /// Pop exactly `out.len()` bytes from the read cursor
    pub fn pop(&mut self, out: &mut [u8]) -> DeskResult<usize> {
        if out.is_empty() {
            return Err(StatusCode::InvalidLength.into());
        }
        if self.is_empty() || out.len() > self.remaining() {
            return Err(StatusCode::QueueEmpty.into());
        }

        out.copy_from_slice(&self.data[self.rd..self.rd + out.len()]);
        self.rd += out.len();
        Ok(out.len())
    }

    /// Number of written bytes not yet popped
    pub fn remaining(&self) -> usize {
        self.wr - self.rd
    }

    /// Current read cursor
    pub fn read_index(&self) -> usize {
        self.rd
    }

    /// Current write cursor
    pub fn write_index(&self) -> usize {
        self.wr
    }

    /// Move the write cursor, e.g. after filling `as_bytes_mut()` directly
    pub fn set_write_index(&mut self, index: usize) -> DeskResult<()> {
        if index < self.rd || index > self.size {
            return Err(StatusCode::InvalidLength.into());
        }
        self.wr = index;
        Ok(())
    }

    /// Override the logical size independent of the allocation
    pub fn set_logical_size(&mut self, size: usize) -> DeskResult<()> {
        if size > self.data.len() || size < self.wr {
            return Err(StatusCode::InvalidLength.into());
        }
        self.size = size;
        Ok(())
    }

    /// Logical size (capacity unless shrunk)
    pub fn size(&self) -> usize {
        self.size
    }

    /// Allocated capacity
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Bytes up to the logical size
    pub fn as_bytes(&self) -> &[u8] {
        &self.data[..self.size]
    }

    /// Mutable bytes up to the logical size, for raw loads
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data[..self.size]
    }

    /// Bytes written so far
    pub fn written(&self) -> &[u8] {
        &self.data[..self.wr]
    }
}

impl std::fmt::Debug for Fifo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fifo")
            .field("rd", &self.rd)
            .field("wr", &self.wr)
            .field("size", &self.size)
            .field("capacity", &self.data.len())
            .finish()
    }
}

impl Write for Fifo {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        // The status travels inside; `DeskError::from` unwraps it
        self.push(buf)
            .map_err(|e| io::Error::new(io::ErrorKind::WriteZero, e))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Read for Fifo {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = buf.len().min(self.remaining());
        if n == 0 {
            return Ok(0);
        }
        self.pop(&mut buf[..n])
            .map_err(|e| io::Error::new(io::ErrorKind::UnexpectedEof, e))
    }
}
