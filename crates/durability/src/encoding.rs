//! WAL entry framing
//!
//! ```text
//! +----------------+--------------------+---------------------+---------------------------+
//! | length: u32 LE | header crc: u32 LE | frame crc: u32 LE   | payload: bincode(WalEntry)|
//! +----------------+--------------------+---------------------+---------------------------+
//! ```
//!
//! The header checksum covers the length bytes alone, so a damaged length
//! is detected before it is used to find the end of the frame. The frame
//! checksum covers the length bytes and the payload.
//!
//! A header that fails its checksum is corruption. A header that checks out
//! but announces more bytes than the file holds is a torn write.

use crate::entry::WalEntry;
use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};
use ledgerstore_core::{Error, Result};

/// Bytes preceding every payload.
pub const FRAME_HEADER_SIZE: usize = 12;

/// Encode an entry into a self-describing frame.
pub fn encode_entry(entry: &WalEntry) -> Result<Vec<u8>> {
    let payload = bincode::serialize(entry)?;
    let len = u32::try_from(payload.len()).map_err(|_| {
        Error::SerializationError(format!("WAL entry too large: {} bytes", payload.len()))
    })?;

    let mut frame = Vec::with_capacity(FRAME_HEADER_SIZE + payload.len());
    frame.write_u32::<LittleEndian>(len)?;
    frame.write_u32::<LittleEndian>(header_checksum(len))?;
    frame.write_u32::<LittleEndian>(frame_checksum(len, &payload))?;
    frame.extend_from_slice(&payload);
    Ok(frame)
}

/// Read and verify the frame header at the start of `buf`.
///
/// Returns the payload length announced by a header whose checksum holds.
///
/// # Errors
///
/// - [`Error::IncompleteEntry`] if `buf` is shorter than a header
/// - [`Error::Corruption`] if the header checksum does not match
pub fn decode_header(buf: &[u8], offset: u64) -> Result<usize> {
    if buf.len() < FRAME_HEADER_SIZE {
        return Err(Error::IncompleteEntry {
            offset,
            have: buf.len(),
            needed: FRAME_HEADER_SIZE,
        });
    }

    let len = LittleEndian::read_u32(&buf[0..4]);
    let expected = LittleEndian::read_u32(&buf[4..8]);
    let actual = header_checksum(len);
    if actual != expected {
        return Err(Error::Corruption(format!(
            "header checksum mismatch at offset {}: expected {:#010x}, got {:#010x}",
            offset, expected, actual
        )));
    }
    Ok(len as usize)
}

/// Decode the frame at the start of `buf`.
///
/// `offset` is the position of `buf` within the log and is only used for
/// error reporting. Returns the entry and the number of bytes consumed.
///
/// # Errors
///
/// - [`Error::IncompleteEntry`] if `buf` ends before the frame does
/// - [`Error::Corruption`] if either checksum does not match
/// - [`Error::SerializationError`] if a checksummed payload fails to decode
pub fn decode_entry(buf: &[u8], offset: u64) -> Result<(WalEntry, usize)> {
    let len = decode_header(buf, offset)?;
    let total = FRAME_HEADER_SIZE + len;

    if buf.len() < total {
        return Err(Error::IncompleteEntry {
            offset,
            have: buf.len(),
            needed: total,
        });
    }

    let expected_crc = LittleEndian::read_u32(&buf[8..12]);
    let payload = &buf[FRAME_HEADER_SIZE..total];
    let actual_crc = frame_checksum(len as u32, payload);
    if actual_crc != expected_crc {
        return Err(Error::Corruption(format!(
            "checksum mismatch at offset {}: expected {:#010x}, got {:#010x}",
            offset, expected_crc, actual_crc
        )));
    }

    let entry: WalEntry = bincode::deserialize(payload)?;
    Ok((entry, total))
}

fn header_checksum(len: u32) -> u32 {
    crc32fast::hash(&len.to_le_bytes())
}

fn frame_checksum(len: u32, payload: &[u8]) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(&len.to_le_bytes());
    hasher.update(payload);
    hasher.finalize()
}
