//! Record file store
//!
//! A record file is a flat sequence of framed records:
//!
//! ```text
//! [len:8][record bytes:len][len:8][record bytes:len]...
//! ```
//!
//! There is no header and no index. Files are read front to back and
//! rewritten whole on save.

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use byteorder::{ByteOrder, LittleEndian};
use tracing::{debug, warn};

use super::codec::{Codec, LEN_PREFIX};
use super::fifo::Fifo;
use crate::collection::{InsertFlags, OrderedList, Record};
use crate::error::{DeskError, DeskResult, StatusCode};

/// Largest record length accepted from a file
pub const MAX_RECORD_LEN: usize = 1 << 20;

/// How a record file is opened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    /// Existing file, read only
    Read,
    /// Create or truncate, read-write
    Write,
    /// Read-write, created if missing, contents kept
    Update,
}

/// Where a read or write starts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Start,
    Current,
    End,
}

/// One record file on disk
#[derive(Debug)]
pub struct RecordFile {
    path: PathBuf,
    file: Option<File>,
    mode: Option<OpenMode>,
    /// Running size: set by reads from the start, grown by writes at the end
    size: u64,
}

impl RecordFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        RecordFile {
            path: path.into(),
            file: None,
            mode: None,
            size: 0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_open(&self) -> bool {
        self.file.is_some()
    }

    /// Mode of the open file, if any
    pub fn mode(&self) -> Option<OpenMode> {
        self.mode
    }

    /// Open the file. Opening an already open file is a no-op.
    pub fn open(&mut self, mode: OpenMode) -> DeskResult<()> {
        if self.file.is_some() {
            debug!("{:?} already open", self.path);
            return Ok(());
        }

        let mut options = OpenOptions::new();
        match mode {
            OpenMode::Read => options.read(true),
            OpenMode::Write => options.read(true).write(true).create(true).truncate(true),
            OpenMode::Update => options.read(true).write(true).create(true),
        };

        let file = options.open(&self.path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => DeskError::Status(StatusCode::FileNotFound),
            _ => DeskError::Io(e),
        })?;

        debug!("Opened {:?} ({:?})", self.path, mode);
        self.file = Some(file);
        self.mode = Some(mode);
        self.size = 0;
        Ok(())
    }

    /// Close, then open again in `mode`
    pub fn reopen(&mut self, mode: OpenMode) -> DeskResult<()> {
        if self.file.is_some() {
            self.close()?;
        }
        self.open(mode)
    }

    /// Close the file, syncing it first if it was writable
    pub fn close(&mut self) -> DeskResult<()> {
        self.size = 0;
        let file = self.file.take().ok_or(StatusCode::FileNotOpen)?;
        if matches!(self.mode.take(), Some(OpenMode::Write | OpenMode::Update)) {
            file.sync_all()?;
        }
        debug!("Closed {:?}", self.path);
        Ok(())
    }

    /// Seek back to the first byte
    pub fn rewind(&mut self) -> DeskResult<()> {
        self.handle()?.seek(SeekFrom::Start(0))?;
        self.size = 0;
        Ok(())
    }

    /// Running size of the file
    pub fn size(&self) -> u64 {
        self.size
    }

    fn handle(&mut self) -> DeskResult<&mut File> {
        self.file
            .as_mut()
            .ok_or(DeskError::Status(StatusCode::FileNotOpen))
    }

    fn seek(&mut self, origin: Origin) -> DeskResult<()> {
        let target = match origin {
            Origin::Start => SeekFrom::Start(0),
            Origin::Current => return Ok(()),
            Origin::End => SeekFrom::End(0),
        };
        self.handle()?.seek(target)?;
        Ok(())
    }

    /// Fill `buf` from `origin`. Returns how many bytes were read, which is
    /// less than `buf.len()` only at end of file.
    pub fn read(&mut self, buf: &mut [u8], origin: Origin) -> DeskResult<usize> {
        self.seek(origin)?;
        if origin == Origin::Start {
            self.size = buf.len() as u64;
        }

        let file = self.handle()?;
        let mut filled = 0;
        while filled < buf.len() {
            match file.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(filled)
    }

    /// Write all of `buf` at `origin`
    pub fn write(&mut self, buf: &[u8], origin: Origin) -> DeskResult<()> {
        self.seek(origin)?;
        self.handle()?.write_all(buf)?;
        if origin == Origin::End {
            self.size += buf.len() as u64;
        }
        Ok(())
    }

    /// Read the next framed record. Returns `None` at a clean end of file.
    pub fn read_record<T: Codec>(&mut self) -> DeskResult<Option<T>> {
        let mut prefix = [0u8; LEN_PREFIX];
        match self.read(&mut prefix, Origin::Current)? {
            0 => return Ok(None),
            LEN_PREFIX => {}
            n => {
                return Err(DeskError::InvalidFormat(format!(
                    "truncated record length ({} of {} bytes)",
                    n, LEN_PREFIX
                )))
            }
        }

        let len = LittleEndian::read_u64(&prefix);
        if len == 0 {
            return Err(DeskError::InvalidFormat("zero-length record".into()));
        }
        let len = match usize::try_from(len) {
            Ok(len) if len <= MAX_RECORD_LEN => len,
            _ => return Err(StatusCode::RecordTooLarge.into()),
        };

        let mut fifo = Fifo::with_capacity(len)?;
        let got = self.read(fifo.as_bytes_mut(), Origin::Current)?;
        if got < len {
            return Err(DeskError::InvalidFormat(format!(
                "truncated record ({} of {} bytes)",
                got, len
            )));
        }
        fifo.set_write_index(len)?;

        let record = T::decode(&mut fifo)?;
        if !fifo.is_empty() {
            return Err(DeskError::InvalidFormat(format!(
                "{} trailing bytes after record",
                fifo.remaining()
            )));
        }
        Ok(Some(record))
    }

    /// Frame `record` and write it at the end of the file
    pub fn append_record<T: Codec>(&mut self, record: &T) -> DeskResult<()> {
        let fifo = record.to_fifo()?;
        let bytes = fifo.as_bytes();

        let mut prefix = [0u8; LEN_PREFIX];
        LittleEndian::write_u64(&mut prefix, bytes.len() as u64);
        self.write(&prefix, Origin::End)?;
        self.write(bytes, Origin::End)
    }

    /// Read every record into a new clean list sorted by natural order.
    /// Records whose key repeats an earlier one are skipped.
    pub fn load<T: Record + Codec>(&mut self) -> DeskResult<OrderedList<T>> {
        self.reopen(OpenMode::Read)?;
        let result = self.load_open();
        self.close()?;
        result
    }

    fn load_open<T: Record + Codec>(&mut self) -> DeskResult<OrderedList<T>> {
        let mut list = OrderedList::new();
        let mut skipped = 0usize;
        while let Some(record) = self.read_record::<T>()? {
            if list.insert_sorted(record, InsertFlags::empty(), None).is_err() {
                skipped += 1;
            }
        }
        if skipped > 0 {
            warn!("{:?}: skipped {} records with duplicate keys", self.path, skipped);
        }

        list.set_dirty(false);
        debug!("Loaded {} records from {:?}", list.len(), self.path);
        Ok(list)
    }

    /// Rewrite the file with every record of `list` and mark it clean.
    /// Returns the number of records written.
    pub fn save<T: Record + Codec>(&mut self, list: &mut OrderedList<T>) -> DeskResult<usize> {
        self.reopen(OpenMode::Write)?;

        let mut written = 0;
        list.rewind();
        let result = loop {
            let Some(record) = list.pop() else {
                break Ok(());
            };
            if let Err(e) = self.append_record(record) {
                break Err(e);
            }
            written += 1;
        };
        let closed = self.close();
        result?;
        closed?;

        list.set_dirty(false);
        debug!("Saved {} records to {:?}", written, self.path);
        Ok(written)
    }
}
