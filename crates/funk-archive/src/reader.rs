use std::io::{ErrorKind, Read};

use crate::entry::FileEntry;
use crate::error::{ArchiveError, ArchiveResult};
use crate::header::{padding, RecordHeader, BLOCK_SIZE};

/// Cap on the up-front allocation for a record payload; larger payloads grow
/// as bytes actually arrive.
const MAX_PREALLOC: u64 = 64 * 1024;

/// One record read back from an archive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArchivedFile {
    pub name: String,
    /// Permission bits recorded in the header.
    pub mode: u32,
    pub content: Vec<u8>,
}

impl From<ArchivedFile> for FileEntry {
    fn from(file: ArchivedFile) -> Self {
        FileEntry {
            name: file.name,
            content: file.content,
        }
    }
}

/// Sequential record reader over any byte stream.
///
/// The stream must end with the end-of-archive marker. Running out of bytes
/// anywhere before it, whether mid-record or on a record boundary, is
/// reported as [`ArchiveError::Corrupt`].
pub struct ArchiveReader<R> {
    inner: R,
    offset: u64,
    finished: bool,
}

impl<R: Read> ArchiveReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            offset: 0,
            finished: false,
        }
    }

    /// Bytes consumed so far.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Read the next record, or `None` once the end marker is reached.
    pub fn next_entry(&mut self) -> ArchiveResult<Option<ArchivedFile>> {
        if self.finished {
            return Ok(None);
        }
        match self.read_record() {
            Ok(None) => {
                self.finished = true;
                Ok(None)
            }
            Ok(Some(file)) => Ok(Some(file)),
            Err(e) => {
                self.finished = true;
                Err(e)
            }
        }
    }

    fn read_record(&mut self) -> ArchiveResult<Option<ArchivedFile>> {
        let start = self.offset;
        let mut block = [0u8; BLOCK_SIZE];
        match self.read_full(&mut block)? {
            0 => {
                return Err(ArchiveError::corrupt(
                    start,
                    "stream ended before end-of-archive marker",
                ))
            }
            n if n < BLOCK_SIZE => {
                return Err(ArchiveError::corrupt(
                    start,
                    format!("truncated header: {n} of {BLOCK_SIZE} bytes"),
                ))
            }
            _ => {}
        }

        let header = match RecordHeader::decode(&block, start)? {
            Some(header) => header,
            None => {
                // The second marker block may be missing, but if present it
                // must be zero: a zeroed header mid-archive looks like a
                // first marker block followed by record data.
                let second_start = self.offset;
                let mut second = [0u8; BLOCK_SIZE];
                let n = self.read_full(&mut second)?;
                if second[..n].iter().any(|&b| b != 0) {
                    return Err(ArchiveError::corrupt(
                        second_start,
                        "data after end-of-archive marker",
                    ));
                }
                return Ok(None);
            }
        };

        let mut content = Vec::with_capacity(header.size.min(MAX_PREALLOC) as usize);
        let got = (&mut self.inner)
            .take(header.size)
            .read_to_end(&mut content)
            .map_err(ArchiveError::Stream)? as u64;
        self.offset += got;
        if got < header.size {
            return Err(ArchiveError::corrupt(
                start,
                format!(
                    "record {:?} declares {} bytes but only {got} are available",
                    header.name, header.size
                ),
            ));
        }

        let pad = padding(header.size);
        let mut pad_buf = [0u8; BLOCK_SIZE];
        let got = self.read_full(&mut pad_buf[..pad])?;
        if got < pad {
            return Err(ArchiveError::corrupt(
                start,
                format!("record {:?} is missing its padding", header.name),
            ));
        }

        tracing::debug!(name = %header.name, size = header.size, offset = start, "read archive record");
        Ok(Some(ArchivedFile {
            name: header.name,
            mode: header.mode,
            content,
        }))
    }

    /// Fill `buf` as far as the stream allows, returning the bytes read.
    fn read_full(&mut self, buf: &mut [u8]) -> ArchiveResult<usize> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.inner.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(ArchiveError::Stream(e)),
            }
        }
        self.offset += filled as u64;
        Ok(filled)
    }
}

impl<R: Read> Iterator for ArchiveReader<R> {
    type Item = ArchiveResult<ArchivedFile>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_entry().transpose()
    }
}

/// Read every record of an in-memory archive.
pub fn read_entries(archive: &[u8]) -> ArchiveResult<Vec<ArchivedFile>> {
    ArchiveReader::new(archive).collect()
}
