//! Protocol Module
//!
//! Defines the wire protocol between the dictionary client and server.
//!
//! ## Frame Format
//! Every message in either direction is one length-prefixed string:
//! ```text
//! ┌──────────┬─────────────────────────────────────┐
//! │ Len (2)  │   Payload (modified UTF-8, Len B)   │
//! └──────────┴─────────────────────────────────────┘
//! ```
//! `Len` is an unsigned 16-bit big-endian byte count.
//!
//! ## Session Flow
//! ```text
//! client                        server
//!   │ ──────── connect ────────▶ │
//!   │ ◀─────── greeting ──────── │
//!   │ ──────── request ────────▶ │
//!   │ ◀─────── response ──────── │
//!   │ ──────── close ──────────▶ │
//! ```
//!
//! ## Request Payloads
//! - `query|<word>`
//! - `add|<word>|<meaning>`
//! - `remove|<word>`
//!
//! ## Response Payloads
//! Opaque text. A failed lookup answers with [`WORD_NOT_FOUND`] verbatim.

mod request;
mod response;
mod codec;

pub use request::{Operator, Request, SEPARATOR};
pub use response::{
    is_not_found, INVALID_REQUEST_PREFIX, WORD_ADDED, WORD_NOT_FOUND, WORD_REMOVED, WORD_UPDATED,
};
pub use codec::{
    decode_request, decode_string, encode_frame, encode_request, encode_string, read_frame,
    write_frame, LENGTH_PREFIX_SIZE, MAX_FRAME_LEN,
};
