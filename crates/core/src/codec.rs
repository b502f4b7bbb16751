//! Wire text codec: a closed dispatch table over the message kinds.
//!
//! Each payload kind is identified on the wire by a stable discriminator
//! string, carried as the single key of a JSON object:
//!
//! ```text
//! {"Message": {"Genome": {"id": 7, "bodyId": 2, "fitness": 9.5, ...}}}
//! ```
//!
//! Dispatch is an explicit match over the enumerated discriminators, not
//! open-ended reflection: a tag outside the table is
//! [`DecodeError::UnknownDiscriminator`], while a known tag with a bad body
//! is [`DecodeError::MalformedPayload`].
//!
//! Encoding builds `serde_json::Value` trees by hand, which cannot fail, so
//! `encode_*` is total for every in-memory value. Decoding drives serde into
//! the concrete payload types; required fields are enforced there.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::DecodeError;
use crate::genome::{FitnessWeights, Genome};
use crate::message::{Content, Message};

/// Root tag every wire payload is wrapped in.
const ENVELOPE_TAG: &str = "Message";

/// The complete set of content discriminators, in dispatch order.
pub const DISCRIMINATORS: [&str; 5] = [
    "Command",
    "Advice",
    "ErrorMessage",
    "Genome",
    "FitnessWeights",
];

/// Encode a full message envelope to wire text. Total.
pub fn encode_message(message: &Message) -> String {
    let mut root = Map::new();
    root.insert(ENVELOPE_TAG.to_string(), content_value(&message.content));
    Value::Object(root).to_string()
}

/// Decode wire text into a message envelope.
///
/// The root must be exactly one `"Message"` entry; everything inside is
/// delegated to the content dispatch.
pub fn decode_message(text: &str) -> std::result::Result<Message, DecodeError> {
    let (tag, inner) = single_entry(parse_value(text)?)?;
    if tag != ENVELOPE_TAG {
        return Err(DecodeError::MalformedPayload(format!(
            "expected `{}` envelope, found `{}`",
            ENVELOPE_TAG, tag
        )));
    }
    Ok(Message::new(decode_content_value(inner)?))
}

/// Encode one content payload (tagged, without the envelope). Total.
pub fn encode_content(content: &Content) -> String {
    content_value(content).to_string()
}

/// Decode one content payload (tagged, without the envelope).
pub fn decode_content(text: &str) -> std::result::Result<Content, DecodeError> {
    decode_content_value(parse_value(text)?)
}

fn content_value(content: &Content) -> Value {
    let body = match content {
        Content::Command(c) => {
            let mut map = Map::new();
            map.insert("command".to_string(), Value::String(c.command.clone()));
            map.insert("arg".to_string(), Value::String(c.arg.clone()));
            Value::Object(map)
        }
        Content::Advice(a) => {
            let mut map = Map::new();
            map.insert("text".to_string(), Value::String(a.text.clone()));
            Value::Object(map)
        }
        Content::ErrorMessage(e) => {
            let mut map = Map::new();
            map.insert("name".to_string(), Value::String(e.name.clone()));
            map.insert("text".to_string(), Value::String(e.text.clone()));
            Value::Object(map)
        }
        Content::Genome(g) => genome_value(g),
        Content::FitnessWeights(w) => weights_value(w),
    };

    let mut tagged = Map::new();
    tagged.insert(content.discriminator().to_string(), body);
    Value::Object(tagged)
}

fn genome_value(genome: &Genome) -> Value {
    let mut map = Map::new();
    map.insert("id".to_string(), Value::from(genome.id));
    map.insert("bodyId".to_string(), Value::from(genome.body_id));
    map.insert("fitness".to_string(), Value::from(genome.fitness));
    map.insert("timeAlive".to_string(), Value::from(genome.time_alive));
    map.insert("champ".to_string(), Value::Bool(genome.champ));
    map.insert("rawFitness".to_string(), weights_value(&genome.raw_fitness));
    Value::Object(map)
}

/// All six dimensions are always written, so a decoder on the other side
/// never has to guess at absent keys.
fn weights_value(weights: &FitnessWeights) -> Value {
    let mut map = Map::new();
    for (dim, value) in weights.iter() {
        map.insert(dim.wire_name().to_string(), Value::from(value));
    }
    Value::Object(map)
}

fn decode_content_value(value: Value) -> std::result::Result<Content, DecodeError> {
    let (tag, body) = single_entry(value)?;
    match tag.as_str() {
        "Command" => Ok(Content::Command(from_value(body)?)),
        "Advice" => Ok(Content::Advice(from_value(body)?)),
        "ErrorMessage" => Ok(Content::ErrorMessage(from_value(body)?)),
        "Genome" => Ok(Content::Genome(from_value(body)?)),
        "FitnessWeights" => Ok(Content::FitnessWeights(from_value(body)?)),
        _ => Err(DecodeError::UnknownDiscriminator(tag)),
    }
}

fn parse_value(text: &str) -> std::result::Result<Value, DecodeError> {
    serde_json::from_str(text)
        .map_err(|err| DecodeError::MalformedPayload(format!("invalid message text: {}", err)))
}

fn from_value<T: DeserializeOwned>(value: Value) -> std::result::Result<T, DecodeError> {
    serde_json::from_value(value).map_err(|err| DecodeError::MalformedPayload(err.to_string()))
}

/// Split a `{"Tag": body}` object into its one entry.
fn single_entry(value: Value) -> std::result::Result<(String, Value), DecodeError> {
    let map = match value {
        Value::Object(map) => map,
        other => {
            return Err(DecodeError::MalformedPayload(format!(
                "expected a tagged object, found {}",
                json_kind(&other)
            )))
        }
    };

    let mut entries = map.into_iter();
    match (entries.next(), entries.next()) {
        (Some((tag, body)), None) => Ok((tag, body)),
        (None, _) => Err(DecodeError::MalformedPayload(
            "empty object where a tagged entry was expected".to_string(),
        )),
        _ => Err(DecodeError::MalformedPayload(
            "more than one tagged entry in object".to_string(),
        )),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
