//! Response definitions
//!
//! Responses carry no status code; callers tell outcomes apart by these
//! exact strings, so they must match the server byte for byte.

/// Reply to a `query` or `remove` for a word the dictionary does not hold
pub const WORD_NOT_FOUND: &str = "Word not found in dictionary.";

/// Reply to an `add` that inserted a new word
pub const WORD_ADDED: &str = "Word added to dictionary.";

/// Reply to an `add` that replaced an existing meaning
pub const WORD_UPDATED: &str = "Meaning of word updated.";

/// Reply to a `remove` that deleted a word
pub const WORD_REMOVED: &str = "Word removed from dictionary.";

/// Prefix of the reply to a request the server could not parse
pub const INVALID_REQUEST_PREFIX: &str = "Invalid request: ";

/// Check whether a response is the not-found sentinel
pub fn is_not_found(response: &str) -> bool {
    response == WORD_NOT_FOUND
}
