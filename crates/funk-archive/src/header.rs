//! ustar record header codec.
//!
//! Each record starts with one 512-byte header block:
//!
//! | offset | len | field    | value written                         |
//! |--------|-----|----------|---------------------------------------|
//! | 0      | 100 | name     | entry name, NUL padded                |
//! | 100    | 8   | mode     | `0000600\0`                           |
//! | 108    | 8   | uid      | `0000000\0`                           |
//! | 116    | 8   | gid      | `0000000\0`                           |
//! | 124    | 12  | size     | 11 octal digits + NUL                 |
//! | 136    | 12  | mtime    | `00000000000\0`                       |
//! | 148    | 8   | chksum   | 6 octal digits + NUL + space          |
//! | 156    | 1   | typeflag | `'0'` (regular file)                  |
//! | 257    | 6   | magic    | `ustar\0`                             |
//! | 263    | 2   | version  | `00`                                  |
//!
//! Every other byte is zero. Two all-zero blocks terminate the archive.

use crate::entry::validate_entry_name;
use crate::error::{ArchiveError, ArchiveResult};

/// Size of a header block and the unit payloads are padded to.
pub const BLOCK_SIZE: usize = 512;

/// Largest payload the 11-digit octal size field can describe.
pub const MAX_ENTRY_SIZE: u64 = 0o777_7777_7777;

const NAME: std::ops::Range<usize> = 0..100;
const MODE: std::ops::Range<usize> = 100..108;
const UID: std::ops::Range<usize> = 108..116;
const GID: std::ops::Range<usize> = 116..124;
const SIZE: std::ops::Range<usize> = 124..136;
const MTIME: std::ops::Range<usize> = 136..148;
const CHKSUM: std::ops::Range<usize> = 148..156;
const TYPEFLAG: usize = 156;
const MAGIC: std::ops::Range<usize> = 257..263;
const VERSION: std::ops::Range<usize> = 263..265;
const PREFIX: std::ops::Range<usize> = 345..500;

const USTAR_MAGIC: &[u8] = b"ustar\0";
const REGULAR_FILE: u8 = b'0';
const REGULAR_FILE_OLD: u8 = b'\0';

/// Decoded fields of one record header.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordHeader {
    pub name: String,
    pub mode: u32,
    pub size: u64,
}

impl RecordHeader {
    /// Encode into a header block. The caller validates `name` and `size`.
    pub fn encode(&self) -> [u8; BLOCK_SIZE] {
        let mut block = [0u8; BLOCK_SIZE];
        block[NAME][..self.name.len()].copy_from_slice(self.name.as_bytes());
        write_octal(&mut block[MODE], u64::from(self.mode));
        write_octal(&mut block[UID], 0);
        write_octal(&mut block[GID], 0);
        write_octal(&mut block[SIZE], self.size);
        write_octal(&mut block[MTIME], 0);
        block[TYPEFLAG] = REGULAR_FILE;
        block[MAGIC].copy_from_slice(USTAR_MAGIC);
        block[VERSION].copy_from_slice(b"00");

        let sum = checksum(&block);
        let field = format!("{sum:06o}\0 ");
        block[CHKSUM].copy_from_slice(field.as_bytes());
        block
    }

    /// Decode a header block found at `offset`.
    ///
    /// Returns `Ok(None)` for an all-zero block, which marks end of archive.
    pub fn decode(block: &[u8; BLOCK_SIZE], offset: u64) -> ArchiveResult<Option<Self>> {
        if block.iter().all(|&b| b == 0) {
            return Ok(None);
        }

        let stored = parse_octal(&block[CHKSUM], offset, "chksum")?;
        let (unsigned, signed) = (checksum(block), signed_checksum(block));
        if stored != unsigned && stored as i64 != signed {
            return Err(ArchiveError::corrupt(
                offset,
                format!("header checksum mismatch: stored {stored:o}, computed {unsigned:o}"),
            ));
        }

        match block[TYPEFLAG] {
            REGULAR_FILE | REGULAR_FILE_OLD => {}
            other => {
                return Err(ArchiveError::corrupt(
                    offset,
                    format!("unsupported entry type {:?}", other as char),
                ));
            }
        }

        let mut name = field_str(&block[NAME], offset)?;
        if &block[MAGIC] == USTAR_MAGIC {
            let prefix = field_str(&block[PREFIX], offset)?;
            if !prefix.is_empty() {
                name = format!("{prefix}/{name}");
            }
        }
        if let Err(err) = validate_entry_name(&name) {
            return Err(ArchiveError::corrupt(offset, format!("unsafe entry: {err}")));
        }

        let mode = (parse_octal(&block[MODE], offset, "mode")? & 0o7777) as u32;
        let size = parse_octal(&block[SIZE], offset, "size")?;
        Ok(Some(Self { name, mode, size }))
    }
}

/// Zero bytes needed after a payload of `size` bytes to reach a block boundary.
pub fn padding(size: u64) -> usize {
    let rem = (size % BLOCK_SIZE as u64) as usize;
    if rem == 0 {
        0
    } else {
        BLOCK_SIZE - rem
    }
}

/// Write `value` as zero-padded octal filling all but the last byte, which is NUL.
fn write_octal(field: &mut [u8], value: u64) {
    let width = field.len() - 1;
    let digits = format!("{value:0width$o}");
    field[..width].copy_from_slice(digits.as_bytes());
    field[width] = 0;
}

fn parse_octal(field: &[u8], offset: u64, what: &str) -> ArchiveResult<u64> {
    if field.first().is_some_and(|b| b & 0x80 != 0) {
        return Err(ArchiveError::corrupt(
            offset,
            format!("base-256 {what} field is not supported"),
        ));
    }
    let digits: Vec<u8> = field
        .iter()
        .copied()
        .skip_while(|&b| b == b' ')
        .take_while(|&b| b != 0 && b != b' ')
        .collect();
    let mut value: u64 = 0;
    for b in digits {
        if !(b'0'..=b'7').contains(&b) {
            return Err(ArchiveError::corrupt(
                offset,
                format!("non-octal byte {:?} in {what} field", b as char),
            ));
        }
        value = value
            .checked_mul(8)
            .map(|v| v + u64::from(b - b'0'))
            .ok_or_else(|| ArchiveError::corrupt(offset, format!("{what} field overflows")))?;
    }
    Ok(value)
}

fn field_str(field: &[u8], offset: u64) -> ArchiveResult<String> {
    let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
    String::from_utf8(field[..end].to_vec())
        .map_err(|_| ArchiveError::corrupt(offset, "entry name is not valid UTF-8"))
}

/// Sum of all header bytes with the checksum field counted as spaces.
fn checksum(block: &[u8; BLOCK_SIZE]) -> u64 {
    block
        .iter()
        .enumerate()
        .map(|(i, &b)| if CHKSUM.contains(&i) { u64::from(b' ') } else { u64::from(b) })
        .sum()
}

/// Historic producers summed bytes as signed chars.
fn signed_checksum(block: &[u8; BLOCK_SIZE]) -> i64 {
    block
        .iter()
        .enumerate()
        .map(|(i, &b)| if CHKSUM.contains(&i) { i64::from(b' ') } else { i64::from(b as i8) })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(name: &str, size: u64) -> RecordHeader {
        RecordHeader {
            name: name.into(),
            mode: 0o600,
            size,
        }
    }

    #[test]
    fn encode_decode_roundtrip() {
        let h = header("main.tf", 1234);
        let block = h.encode();
        assert_eq!(RecordHeader::decode(&block, 0).unwrap(), Some(h));
    }

    #[test]
    fn encoded_fields_are_ustar() {
        let block = header("a.tf", 5).encode();
        assert_eq!(&block[0..4], b"a.tf");
        assert_eq!(&block[MODE], b"0000600\0");
        assert_eq!(&block[SIZE], b"00000000005\0");
        assert_eq!(block[TYPEFLAG], b'0');
        assert_eq!(&block[MAGIC], b"ustar\0");
        assert_eq!(&block[VERSION], b"00");
        assert_eq!(block[CHKSUM.end - 1], b' ');
        assert_eq!(block[CHKSUM.end - 2], 0);
    }

    #[test]
    fn zero_block_is_end_marker() {
        assert_eq!(RecordHeader::decode(&[0u8; BLOCK_SIZE], 0).unwrap(), None);
    }

    #[test]
    fn checksum_mismatch_is_corrupt() {
        let mut block = header("a.tf", 5).encode();
        block[0] = b'b';
        let err = RecordHeader::decode(&block, 1024).unwrap_err();
        match err {
            ArchiveError::Corrupt { offset, reason } => {
                assert_eq!(offset, 1024);
                assert!(reason.contains("checksum"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn max_size_fits_field() {
        let block = header("big", MAX_ENTRY_SIZE).encode();
        let decoded = RecordHeader::decode(&block, 0).unwrap().unwrap();
        assert_eq!(decoded.size, MAX_ENTRY_SIZE);
    }

    #[test]
    fn directory_entries_are_rejected() {
        let mut block = header("dir", 0).encode();
        block[TYPEFLAG] = b'5';
        let sum = checksum(&block);
        block[CHKSUM].copy_from_slice(format!("{sum:06o}\0 ").as_bytes());
        let err = RecordHeader::decode(&block, 0).unwrap_err();
        assert!(err.is_corrupt());
    }

    #[test]
    fn traversal_names_are_rejected() {
        let block = header("..", 0).encode();
        assert!(RecordHeader::decode(&block, 0).unwrap_err().is_corrupt());
    }

    #[test]
    fn padding_rounds_to_block() {
        assert_eq!(padding(0), 0);
        assert_eq!(padding(1), 511);
        assert_eq!(padding(512), 0);
        assert_eq!(padding(513), 511);
    }

    #[test]
    fn parse_octal_accepts_space_padding() {
        assert_eq!(parse_octal(b"   644 \0", 0, "mode").unwrap(), 0o644);
        assert_eq!(parse_octal(b"\0\0\0\0", 0, "mode").unwrap(), 0);
        assert!(parse_octal(b"0009\0", 0, "size").is_err());
    }
}
