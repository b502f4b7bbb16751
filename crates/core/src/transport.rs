//! Framed transport over a single bidirectional TCP stream.
//!
//! The engine speaks an unstructured byte stream, so message boundaries are
//! imposed here: every frame is a 4-byte big-endian unsigned length followed
//! by exactly that many bytes of UTF-8 text. Sender and receiver must agree
//! byte-for-byte on this prefix; there is no resynchronization mechanism, so
//! a frame that breaks mid-write poisons the connection and the transport
//! tears it down rather than reuse it.
//!
//! # Frame Format
//!
//! ```text
//! +------------------+
//! | length (4)       |  u32 big-endian, byte length of the body
//! +------------------+
//! | body             |  length bytes of UTF-8 message text
//! | (variable)       |
//! +------------------+
//! ```
//!
//! The length counts **bytes** of the UTF-8 encoding, not characters; the
//! same encoding is used for the prefix computation and the body write.
//!
//! # Offline mode
//!
//! A transport can be constructed without a peer. Sends then succeed by
//! echoing the payload to the log, and receives report
//! [`RecvError::Offline`]. This is an explicit, constructor-selected mode:
//! callers opt in through configuration, nothing degrades silently.
//!
//! # Thread Safety
//!
//! One reader and one writer may run concurrently on the full-duplex
//! stream. Additional concurrent senders (or receivers) serialize on the
//! role's lock; whichever receiver is next gets whichever frame arrives
//! next.

use std::io::{ErrorKind, Read, Write};
use std::net::{Shutdown, TcpStream};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use crate::error::{ConnectError, RecvError, SendError};

/// Bytes in the frame length prefix.
pub const PREFIX_SIZE: usize = 4;

/// A transport handle owning one connection to the engine (or none, in
/// offline mode).
pub struct Transport {
    link: Link,
    counters: Counters,
}

enum Link {
    Online {
        stream: TcpStream,
        read_lock: Mutex<()>,
        write_lock: Mutex<()>,
        closed: AtomicBool,
    },
    Offline,
}

#[derive(Default)]
struct Counters {
    frames_sent: AtomicU64,
    frames_received: AtomicU64,
    bytes_sent: AtomicU64,
    bytes_received: AtomicU64,
    offline_echoes: AtomicU64,
}

impl Transport {
    /// Open a connection to the engine.
    pub fn connect(host: &str, port: u16) -> std::result::Result<Self, ConnectError> {
        let stream =
            TcpStream::connect((host, port)).map_err(|source| ConnectError::Unreachable {
                host: host.to_string(),
                port,
                source,
            })?;
        log::debug!("connected to engine at {}:{}", host, port);
        Ok(Self::online(stream))
    }

    /// Construct a transport with no peer: sends echo locally, receives
    /// fail with [`RecvError::Offline`].
    pub fn offline() -> Self {
        Self {
            link: Link::Offline,
            counters: Counters::default(),
        }
    }

    /// Connect, or fall back to offline echo mode when the toggle allows.
    ///
    /// The fallback is logged at warn level so a missing engine is never
    /// silent.
    pub fn connect_or_offline(
        host: &str,
        port: u16,
        fallback_offline: bool,
    ) -> std::result::Result<Self, ConnectError> {
        match Self::connect(host, port) {
            Ok(transport) => Ok(transport),
            Err(err) if fallback_offline => {
                log::warn!("{}; continuing in offline echo mode", err);
                Ok(Self::offline())
            }
            Err(err) => Err(err),
        }
    }

    fn online(stream: TcpStream) -> Self {
        Self {
            link: Link::Online {
                stream,
                read_lock: Mutex::new(()),
                write_lock: Mutex::new(()),
                closed: AtomicBool::new(false),
            },
            counters: Counters::default(),
        }
    }

    /// Whether this transport was constructed without a peer.
    pub fn is_offline(&self) -> bool {
        matches!(self.link, Link::Offline)
    }

    /// Whether the connection has been torn down (always false offline).
    pub fn is_closed(&self) -> bool {
        match &self.link {
            Link::Online { closed, .. } => closed.load(Ordering::Acquire),
            Link::Offline => false,
        }
    }

    /// Write one frame.
    ///
    /// Empty payloads are rejected before touching the wire. A mid-frame
    /// I/O failure leaves the stream unrecoverable, so the connection is
    /// closed before the error is returned.
    pub fn send(&self, text: &str) -> std::result::Result<(), SendError> {
        if text.is_empty() {
            return Err(SendError::EmptyPayload);
        }

        let (stream, write_lock, closed) = match &self.link {
            Link::Offline => {
                // No engine on the other end: echo locally, report success.
                log::info!("offline echo: {}", text);
                self.counters.offline_echoes.fetch_add(1, Ordering::Relaxed);
                return Ok(());
            }
            Link::Online {
                stream,
                write_lock,
                closed,
                ..
            } => (stream, write_lock, closed),
        };

        let payload = text.as_bytes();
        let len = u32::try_from(payload.len()).map_err(|_| SendError::TooLarge {
            size: payload.len(),
        })?;

        let _guard = lock_unpoisoned(write_lock);
        if closed.load(Ordering::Acquire) {
            return Err(SendError::Closed);
        }

        // Prefix and body go out as one buffer under the writer lock, so
        // two senders can never interleave halves of different frames.
        let mut frame = Vec::with_capacity(PREFIX_SIZE + payload.len());
        frame.extend_from_slice(&len.to_be_bytes());
        frame.extend_from_slice(payload);

        let mut writer = stream;
        if let Err(err) = writer.write_all(&frame).and_then(|()| writer.flush()) {
            // The prefix may have reached the peer without its body;
            // framing on this connection is no longer recoverable.
            self.teardown();
            return Err(SendError::Io(err));
        }

        self.counters.frames_sent.fetch_add(1, Ordering::Relaxed);
        self.counters
            .bytes_sent
            .fetch_add(frame.len() as u64, Ordering::Relaxed);
        Ok(())
    }

    /// Read one frame, blocking until the peer supplies it.
    ///
    /// A zero-length frame is valid and yields the empty string. EOF before
    /// the first prefix byte is a clean [`RecvError::Disconnected`]; EOF
    /// anywhere later in the frame is [`RecvError::Truncated`]. Both close
    /// the connection. A body that is not valid UTF-8 only drops that frame.
    pub fn receive(&self) -> std::result::Result<String, RecvError> {
        let (stream, read_lock, closed) = match &self.link {
            Link::Offline => return Err(RecvError::Offline),
            Link::Online {
                stream,
                read_lock,
                closed,
                ..
            } => (stream, read_lock, closed),
        };

        let _guard = lock_unpoisoned(read_lock);
        if closed.load(Ordering::Acquire) {
            return Err(RecvError::Closed);
        }

        let mut reader = stream;

        let mut prefix = [0u8; PREFIX_SIZE];
        let mut filled = 0;
        while filled < prefix.len() {
            match reader.read(&mut prefix[filled..]) {
                Ok(0) => {
                    self.teardown();
                    return Err(if filled == 0 {
                        RecvError::Disconnected
                    } else {
                        RecvError::Truncated
                    });
                }
                Ok(n) => filled += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => {
                    self.teardown();
                    return Err(RecvError::Io(err));
                }
            }
        }

        let len = u32::from_be_bytes(prefix) as usize;
        let mut body = vec![0u8; len];
        if let Err(err) = reader.read_exact(&mut body) {
            self.teardown();
            return Err(match err.kind() {
                ErrorKind::UnexpectedEof => RecvError::Truncated,
                _ => RecvError::Io(err),
            });
        }

        self.counters
            .frames_received
            .fetch_add(1, Ordering::Relaxed);
        self.counters
            .bytes_received
            .fetch_add((PREFIX_SIZE + len) as u64, Ordering::Relaxed);

        // Framing was intact even if the body is not text, so this
        // failure costs the frame, not the connection.
        Ok(String::from_utf8(body)?)
    }

    /// Release the stream. Idempotent; teardown failures are swallowed.
    pub fn close(&self) {
        self.teardown();
    }

    /// Snapshot of traffic counters.
    pub fn stats(&self) -> TransportStats {
        TransportStats {
            frames_sent: self.counters.frames_sent.load(Ordering::Relaxed),
            frames_received: self.counters.frames_received.load(Ordering::Relaxed),
            bytes_sent: self.counters.bytes_sent.load(Ordering::Relaxed),
            bytes_received: self.counters.bytes_received.load(Ordering::Relaxed),
            offline_echoes: self.counters.offline_echoes.load(Ordering::Relaxed),
        }
    }

    fn teardown(&self) {
        if let Link::Online { stream, closed, .. } = &self.link {
            if !closed.swap(true, Ordering::AcqRel) {
                log::debug!("closing engine connection");
                let _ = stream.shutdown(Shutdown::Both);
            }
        }
    }
}

impl Drop for Transport {
    fn drop(&mut self) {
        self.close();
    }
}

/// Statistics about transport traffic.
#[derive(Debug, Clone, Copy)]
pub struct TransportStats {
    /// Frames written to the wire
    pub frames_sent: u64,

    /// Frames fully read from the wire
    pub frames_received: u64,

    /// Bytes written, prefixes included
    pub bytes_sent: u64,

    /// Bytes read, prefixes included
    pub bytes_received: u64,

    /// Sends absorbed by offline echo mode
    pub offline_echoes: u64,
}

fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
