//! Protocol codec
//!
//! Encoding and decoding functions for the wire protocol.
//!
//! ## Wire Format
//! ```text
//! ┌──────────┬─────────────────────────────────────┐
//! │ Len (2)  │            Payload                  │
//! └──────────┴─────────────────────────────────────┘
//! ```
//!
//! ### Payload Encoding
//! Payloads use *modified* UTF-8, the encoding JVM peers read and write with
//! `readUTF`/`writeUTF`. It matches standard UTF-8 for U+0001..=U+FFFF except:
//! - U+0000 is written as the two bytes `C0 80`
//! - supplementary characters are written as a UTF-16 surrogate pair, each
//!   surrogate taking three bytes (six bytes total)

use std::io::{Read, Write};

use bytes::{BufMut, Bytes, BytesMut};

use super::Request;
use crate::error::{DictError, Result};

/// Header size: 2 byte big-endian payload length
pub const LENGTH_PREFIX_SIZE: usize = 2;

/// Largest payload a frame can carry
pub const MAX_FRAME_LEN: usize = u16::MAX as usize;

// =============================================================================
// String Encoding/Decoding
// =============================================================================

/// Encode a string as modified UTF-8 (no length prefix)
pub fn encode_string(s: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(s.len());

    for unit in s.encode_utf16() {
        match unit {
            0x0001..=0x007F => out.push(unit as u8),
            0x0000 | 0x0080..=0x07FF => {
                out.push(0xC0 | (unit >> 6) as u8);
                out.push(0x80 | (unit & 0x3F) as u8);
            }
            _ => {
                out.push(0xE0 | (unit >> 12) as u8);
                out.push(0x80 | ((unit >> 6) & 0x3F) as u8);
                out.push(0x80 | (unit & 0x3F) as u8);
            }
        }
    }

    out
}

/// Decode a modified UTF-8 payload (no length prefix)
pub fn decode_string(bytes: &[u8]) -> Result<String> {
    let mut units: Vec<u16> = Vec::with_capacity(bytes.len());
    let mut pos = 0;

    while pos < bytes.len() {
        let first = bytes[pos];
        match first >> 4 {
            // 0xxxxxxx
            0..=7 => {
                units.push(first as u16);
                pos += 1;
            }
            // 110xxxxx 10xxxxxx
            12 | 13 => {
                let second = continuation(bytes, pos, 1)?;
                units.push(((first as u16 & 0x1F) << 6) | (second as u16 & 0x3F));
                pos += 2;
            }
            // 1110xxxx 10xxxxxx 10xxxxxx
            14 => {
                let second = continuation(bytes, pos, 1)?;
                let third = continuation(bytes, pos, 2)?;
                units.push(
                    ((first as u16 & 0x0F) << 12)
                        | ((second as u16 & 0x3F) << 6)
                        | (third as u16 & 0x3F),
                );
                pos += 3;
            }
            _ => {
                return Err(DictError::Protocol(format!(
                    "Malformed string: invalid lead byte 0x{:02x} at offset {}",
                    first, pos
                )))
            }
        }
    }

    String::from_utf16(&units)
        .map_err(|_| DictError::Protocol("Malformed string: unpaired surrogate".to_string()))
}

/// Fetch the continuation byte at `start + offset`, checking its 10xxxxxx tag
fn continuation(bytes: &[u8], start: usize, offset: usize) -> Result<u8> {
    match bytes.get(start + offset) {
        Some(&b) if b & 0xC0 == 0x80 => Ok(b),
        Some(&b) => Err(DictError::Protocol(format!(
            "Malformed string: bad continuation byte 0x{:02x} at offset {}",
            b,
            start + offset
        ))),
        None => Err(DictError::Protocol(format!(
            "Malformed string: truncated sequence at offset {}",
            start
        ))),
    }
}

// =============================================================================
// Frame Encoding/Decoding
// =============================================================================

/// Encode a string as a complete frame
///
/// Format: payload_len (2) + payload
pub fn encode_frame(payload: &str) -> Result<Bytes> {
    let body = encode_string(payload);
    if body.len() > MAX_FRAME_LEN {
        return Err(DictError::FrameTooLarge { len: body.len() });
    }

    let mut frame = BytesMut::with_capacity(LENGTH_PREFIX_SIZE + body.len());
    frame.put_u16(body.len() as u16);
    frame.put_slice(&body);

    Ok(frame.freeze())
}

/// Encode a request as a complete frame
pub fn encode_request(request: &Request) -> Result<Bytes> {
    encode_frame(&request.to_payload())
}

/// Decode a request from a complete frame
pub fn decode_request(bytes: &[u8]) -> Result<Request> {
    if bytes.len() < LENGTH_PREFIX_SIZE {
        return Err(DictError::Protocol(format!(
            "Incomplete header: expected {} bytes, got {}",
            LENGTH_PREFIX_SIZE,
            bytes.len()
        )));
    }

    let payload_len = u16::from_be_bytes([bytes[0], bytes[1]]) as usize;
    let total_len = LENGTH_PREFIX_SIZE + payload_len;
    if bytes.len() < total_len {
        return Err(DictError::Protocol(format!(
            "Incomplete payload: expected {} bytes, got {}",
            total_len,
            bytes.len()
        )));
    }

    let payload = decode_string(&bytes[LENGTH_PREFIX_SIZE..total_len])?;
    Request::parse(&payload)
}

// =============================================================================
// Stream-based I/O helpers
// =============================================================================

/// Read one frame from a stream
///
/// Blocks until the whole frame has arrived or the stream fails
pub fn read_frame<R: Read>(reader: &mut R) -> Result<String> {
    let mut header = [0u8; LENGTH_PREFIX_SIZE];
    reader.read_exact(&mut header)?;

    let payload_len = u16::from_be_bytes(header) as usize;
    let mut payload = vec![0u8; payload_len];
    if payload_len > 0 {
        reader.read_exact(&mut payload)?;
    }

    decode_string(&payload)
}

/// Write one frame to a stream and flush it
pub fn write_frame<W: Write>(writer: &mut W, payload: &str) -> Result<()> {
    let frame = encode_frame(payload)?;
    writer.write_all(&frame)?;
    writer.flush()?;
    Ok(())
}
