//! Error types for the simbridge client.
//!
//! All operations return structured errors rather than panicking.
//! This enables graceful shutdown and clear error reporting.

use thiserror::Error;

/// Top-level error type for all operations in the client.
///
/// Each variant corresponds to a specific failure domain:
/// - Connect: establishing the stream to the engine
/// - Send: writing a frame to the wire
/// - Recv: reading a frame from the wire
/// - Decode: turning frame text back into a typed message
#[derive(Debug, Error)]
pub enum Error {
    /// Could not establish a connection to the engine
    #[error("connect error: {0}")]
    Connect(#[from] ConnectError),

    /// Failed to write a frame
    #[error("send error: {0}")]
    Send(#[from] SendError),

    /// Failed to read a frame
    #[error("receive error: {0}")]
    Recv(#[from] RecvError),

    /// Frame text did not decode into a known message
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),
}

/// Connection establishment errors.
///
/// Non-fatal: the caller may retry, or degrade to offline echo mode.
#[derive(Debug, Error)]
pub enum ConnectError {
    /// The engine host could not be resolved or reached
    #[error("engine unreachable at {host}:{port}: {source}")]
    Unreachable {
        host: String,
        port: u16,
        #[source]
        source: std::io::Error,
    },
}

/// Frame write errors.
#[derive(Debug, Error)]
pub enum SendError {
    /// Caller passed an empty payload; nothing was written
    #[error("refusing to send an empty payload")]
    EmptyPayload,

    /// Payload does not fit the 4-byte length prefix
    #[error("payload of {size} bytes exceeds the frame size limit")]
    TooLarge { size: usize },

    /// The connection was already torn down
    #[error("connection is closed")]
    Closed,

    /// The wire broke mid-frame; the connection has been torn down
    #[error("I/O failure while writing frame: {0}")]
    Io(#[source] std::io::Error),
}

/// Frame read errors.
#[derive(Debug, Error)]
pub enum RecvError {
    /// Peer closed the stream cleanly between frames
    #[error("peer closed the connection")]
    Disconnected,

    /// Peer closed the stream in the middle of a frame
    #[error("peer closed the stream mid-frame")]
    Truncated,

    /// The connection was already torn down
    #[error("connection is closed")]
    Closed,

    /// Transport is in offline mode; there is nothing to read
    #[error("no connection: transport is offline")]
    Offline,

    /// Frame body was not valid UTF-8; the frame is dropped but the
    /// connection stays usable since the framing itself was intact
    #[error("frame body is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    /// The wire broke mid-frame; the connection has been torn down
    #[error("I/O failure while reading frame: {0}")]
    Io(#[source] std::io::Error),
}

/// Message decode errors.
///
/// Local to a single frame: the connection stays open.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The content tag did not match any known message kind
    #[error("unknown content discriminator `{0}`")]
    UnknownDiscriminator(String),

    /// The text was not valid structured data, or a known kind was
    /// missing required fields
    #[error("malformed payload: {0}")]
    MalformedPayload(String),
}

/// Type alias for Result with our Error type
pub type Result<T> = std::result::Result<T, Error>;
