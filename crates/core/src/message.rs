//! Message envelope and the closed set of payload kinds.
//!
//! Every frame on the wire carries exactly one [`Message`], and every
//! message holds exactly one [`Content`]. The envelope exists so the
//! transport never needs to know which payload kind is inside; callers
//! pattern-match on `Content` after decode.

use std::fmt;

use serde::Deserialize;

use crate::codec;
use crate::error::DecodeError;
use crate::genome::{FitnessWeights, Genome};

/// An imperative instruction to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Command {
    /// Instruction verb, e.g. "deploy" or "pause"
    pub command: String,

    /// Single free-form argument
    pub arg: String,
}

/// Free-form coaching text sent to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Advice {
    pub text: String,
}

/// An error reported by the peer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ErrorMessage {
    /// Short category tag
    pub name: String,

    /// Human-readable description
    pub text: String,
}

impl fmt::Display for ErrorMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.text)
    }
}

/// The closed tagged union of everything that can ride in a message.
///
/// A `FitnessWeights` table can be sent standalone, independent of its use
/// embedded inside `Genome`.
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    Command(Command),
    Advice(Advice),
    ErrorMessage(ErrorMessage),
    Genome(Genome),
    FitnessWeights(FitnessWeights),
}

impl Content {
    /// The stable tag identifying this payload kind on the wire.
    pub fn discriminator(&self) -> &'static str {
        match self {
            Content::Command(_) => "Command",
            Content::Advice(_) => "Advice",
            Content::ErrorMessage(_) => "ErrorMessage",
            Content::Genome(_) => "Genome",
            Content::FitnessWeights(_) => "FitnessWeights",
        }
    }
}

/// Envelope wrapping exactly one [`Content`].
///
/// Carries no state of its own; a decode that cannot populate the content
/// is a failure, never a default value.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub content: Content,
}

impl Message {
    pub fn new(content: Content) -> Self {
        Self { content }
    }

    /// Encode this message to wire text. Total: cannot fail for any
    /// in-memory value.
    pub fn encode(&self) -> String {
        codec::encode_message(self)
    }

    /// Decode wire text back into a message.
    pub fn decode(text: &str) -> std::result::Result<Message, DecodeError> {
        codec::decode_message(text)
    }
}
