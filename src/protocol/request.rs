//! Request definitions
//!
//! Represents the single request a client sends per connection.

use std::fmt;
use std::str::FromStr;

use super::{encode_string, MAX_FRAME_LEN};
use crate::error::{DictError, Result};

/// Field separator inside a request payload
pub const SEPARATOR: char = '|';

/// Command keyword identifying the dictionary action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Query,
    Add,
    Remove,
}

impl Operator {
    /// Wire keyword for this operator
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Query => "query",
            Operator::Add => "add",
            Operator::Remove => "remove",
        }
    }

    /// Number of operands following the keyword
    pub fn arity(&self) -> usize {
        match self {
            Operator::Add => 2,
            Operator::Query | Operator::Remove => 1,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operator {
    type Err = DictError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "query" => Ok(Operator::Query),
            "add" => Ok(Operator::Add),
            "remove" => Ok(Operator::Remove),
            other => Err(DictError::Protocol(format!("Unknown operator: {:?}", other))),
        }
    }
}

/// A dictionary request
///
/// Constructors refuse operands containing [`SEPARATOR`], since the payload
/// has no escaping and such an operand would shift every later field. They
/// also refuse requests whose encoded payload would not fit in one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Look up the meaning of a word
    Query { word: String },

    /// Insert a word or replace its meaning
    Add { word: String, meaning: String },

    /// Delete a word
    Remove { word: String },
}

impl Request {
    pub fn query(word: impl Into<String>) -> Result<Self> {
        let word = checked_operand("word", word.into())?;
        Request::Query { word }.checked_size()
    }

    pub fn add(word: impl Into<String>, meaning: impl Into<String>) -> Result<Self> {
        let word = checked_operand("word", word.into())?;
        let meaning = checked_operand("meaning", meaning.into())?;
        Request::Add { word, meaning }.checked_size()
    }

    pub fn remove(word: impl Into<String>) -> Result<Self> {
        let word = checked_operand("word", word.into())?;
        Request::Remove { word }.checked_size()
    }

    /// Length of the payload once encoded for the wire
    pub fn encoded_len(&self) -> usize {
        encode_string(&self.to_payload()).len()
    }

    /// Fail with `FrameTooLarge` unless the payload fits in one frame
    pub fn ensure_fits_frame(&self) -> Result<()> {
        let len = self.encoded_len();
        if len > MAX_FRAME_LEN {
            return Err(DictError::FrameTooLarge { len });
        }
        Ok(())
    }

    fn checked_size(self) -> Result<Self> {
        self.ensure_fits_frame()?;
        Ok(self)
    }

    /// Get the operator
    pub fn operator(&self) -> Operator {
        match self {
            Request::Query { .. } => Operator::Query,
            Request::Add { .. } => Operator::Add,
            Request::Remove { .. } => Operator::Remove,
        }
    }

    /// The word every request targets
    pub fn word(&self) -> &str {
        match self {
            Request::Query { word } | Request::Add { word, .. } | Request::Remove { word } => word,
        }
    }

    /// Build the `operator|word[|meaning]` payload
    pub fn to_payload(&self) -> String {
        let op = self.operator().as_str();
        match self {
            Request::Query { word } | Request::Remove { word } => {
                format!("{op}{SEPARATOR}{word}")
            }
            Request::Add { word, meaning } => {
                format!("{op}{SEPARATOR}{word}{SEPARATOR}{meaning}")
            }
        }
    }

    /// Parse a payload received by the server
    pub fn parse(payload: &str) -> Result<Self> {
        let mut fields = payload.split(SEPARATOR);
        // split always yields at least one field
        let operator: Operator = fields.next().unwrap_or_default().parse()?;
        let operands: Vec<&str> = fields.collect();

        if operands.len() != operator.arity() {
            return Err(DictError::Protocol(format!(
                "{} expects {} operand(s), got {}",
                operator,
                operator.arity(),
                operands.len()
            )));
        }

        let word = operands[0].to_string();
        Ok(match operator {
            Operator::Query => Request::Query { word },
            Operator::Add => Request::Add {
                word,
                meaning: operands[1].to_string(),
            },
            Operator::Remove => Request::Remove { word },
        })
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_payload())
    }
}

fn checked_operand(name: &str, value: String) -> Result<String> {
    if value.contains(SEPARATOR) {
        return Err(DictError::InvalidOperand(format!(
            "{} must not contain '{}': {:?}",
            name, SEPARATOR, value
        )));
    }
    Ok(value)
}
