//! simbridge-core: client-side bridge to a remote neuroevolution engine
//!
//! This library provides the core components for a training console that:
//! - Exchanges tagged control/telemetry messages with the engine over a
//!   persistent TCP stream
//! - Frames each message with a 4-byte big-endian length prefix
//! - Tracks the evolving population reported by the engine and answers
//!   "who is currently fittest"
//!
//! # Architecture
//!
//! The system is designed around clear module boundaries:
//! - `genome`: shaping dimensions, fitness weights, genome reports
//! - `message`: the content union and the one-slot message envelope
//! - `codec`: discriminator dispatch table, wire text encode/decode
//! - `transport`: socket ownership and length-prefixed framing
//! - `population`: latest-genome-per-body tracking with a fittest cache
//!
//! # Design Principles
//!
//! - **No panics**: all errors are structured and recoverable
//! - **Closed dispatch**: the message vocabulary is a fixed table, never
//!   runtime type discovery
//! - **Explicit degradation**: operating without an engine is a
//!   constructor-selected offline mode, not a silent fallback
//! - **Frame-local failures**: a payload that will not decode costs one
//!   frame, never the connection

pub mod codec;
pub mod error;
pub mod genome;
pub mod message;
pub mod population;
pub mod transport;

// Re-export commonly used types
pub use error::{ConnectError, DecodeError, Error, RecvError, Result, SendError};
pub use genome::{Dimension, FitnessWeights, Genome};
pub use message::{Advice, Command, Content, ErrorMessage, Message};
pub use population::Population;
pub use transport::{Transport, TransportStats};
