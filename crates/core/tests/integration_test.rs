//! Integration tests for the full simbridge pipeline.
//!
//! These tests verify end-to-end behavior over real localhost sockets:
//! encode -> frame -> wire -> unframe -> decode -> population, with an
//! in-process peer standing in for the engine.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::thread::{self, JoinHandle};

use simbridge_core::{
    Content, DecodeError, Dimension, FitnessWeights, Genome, Message, Population, RecvError,
    Transport,
};

/// Raw frame write, independent of the Transport under test.
fn write_frame(stream: &mut TcpStream, text: &str) {
    let bytes = text.as_bytes();
    stream
        .write_all(&(bytes.len() as u32).to_be_bytes())
        .unwrap();
    stream.write_all(bytes).unwrap();
}

/// Raw frame read, independent of the Transport under test.
fn read_frame(stream: &mut TcpStream) -> String {
    let mut prefix = [0u8; 4];
    stream.read_exact(&mut prefix).unwrap();
    let mut body = vec![0u8; u32::from_be_bytes(prefix) as usize];
    stream.read_exact(&mut body).unwrap();
    String::from_utf8(body).unwrap()
}

/// Run `engine` against one accepted connection on an ephemeral port.
fn spawn_engine<F>(engine: F) -> (u16, JoinHandle<()>)
where
    F: FnOnce(TcpStream) + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let handle = thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        engine(stream);
    });
    (port, handle)
}

fn genome(id: i32, body_id: i32, fitness: f32) -> Genome {
    let mut raw_fitness = FitnessWeights::new();
    raw_fitness.set(Dimension::ApproachEnemy, fitness / 2.0);
    raw_fitness.set(Dimension::HitTarget, fitness / 2.0);
    Genome {
        id,
        body_id,
        fitness,
        time_alive: 60,
        champ: false,
        raw_fitness,
    }
}

/// send(s) on one end followed by receive() on the other yields back
/// exactly s, for a one-byte payload.
#[test]
fn test_framing_round_trip_single_byte() {
    let (port, engine) = spawn_engine(|mut stream| {
        let text = read_frame(&mut stream);
        write_frame(&mut stream, &text);
    });

    let transport = Transport::connect("127.0.0.1", port).unwrap();
    transport.send("x").unwrap();
    assert_eq!(transport.receive().unwrap(), "x");
    engine.join().unwrap();
}

/// The length prefix counts UTF-8 bytes, not characters: a multi-kilobyte
/// payload full of non-ASCII text must survive unchanged.
#[test]
fn test_framing_round_trip_non_ascii() {
    let payload = "généalogie Ω gène 🧬 ".repeat(300);
    assert!(payload.len() > 4096);
    assert!(payload.len() > payload.chars().count());

    let (port, engine) = spawn_engine(|mut stream| {
        let text = read_frame(&mut stream);
        write_frame(&mut stream, &text);
    });

    let transport = Transport::connect("127.0.0.1", port).unwrap();
    transport.send(&payload).unwrap();
    assert_eq!(transport.receive().unwrap(), payload);

    let stats = transport.stats();
    assert_eq!(stats.bytes_sent, (payload.len() + 4) as u64);
    assert_eq!(stats.bytes_received, (payload.len() + 4) as u64);
    engine.join().unwrap();
}

/// A zero-length frame is valid transport-level input; it is the envelope
/// decode that rejects the empty text.
#[test]
fn test_zero_length_frame() {
    let (port, engine) = spawn_engine(|mut stream| {
        write_frame(&mut stream, "");
    });

    let transport = Transport::connect("127.0.0.1", port).unwrap();
    let text = transport.receive().unwrap();
    assert_eq!(text, "");
    assert!(matches!(
        Message::decode(&text),
        Err(DecodeError::MalformedPayload(_))
    ));
    engine.join().unwrap();
}

/// Peer closes after the prefix but before the full body: the receiver
/// reports truncation, not a silent short string.
#[test]
fn test_truncated_frame() {
    let (port, engine) = spawn_engine(|mut stream| {
        stream.write_all(&100u32.to_be_bytes()).unwrap();
        stream.write_all(b"only ten b").unwrap();
        // Drop the stream with 90 bytes still owed.
    });

    let transport = Transport::connect("127.0.0.1", port).unwrap();
    assert!(matches!(transport.receive(), Err(RecvError::Truncated)));
    assert!(transport.is_closed());
    engine.join().unwrap();
}

/// A clean close between frames is a disconnect, not truncation.
#[test]
fn test_clean_disconnect() {
    let (port, engine) = spawn_engine(|stream| {
        drop(stream);
    });

    let transport = Transport::connect("127.0.0.1", port).unwrap();
    assert!(matches!(transport.receive(), Err(RecvError::Disconnected)));
    engine.join().unwrap();
}

/// An unknown discriminator costs one frame; the connection keeps working
/// for the frames that follow it.
#[test]
fn test_unknown_discriminator_keeps_connection_usable() {
    let (port, engine) = spawn_engine(|mut stream| {
        write_frame(&mut stream, r#"{"Message": {"Bogus": {}}}"#);
        write_frame(&mut stream, r#"{"Message": {"Advice": {"text": "regroup"}}}"#);
    });

    let transport = Transport::connect("127.0.0.1", port).unwrap();

    let first = transport.receive().unwrap();
    assert!(matches!(
        Message::decode(&first),
        Err(DecodeError::UnknownDiscriminator(_))
    ));

    let second = transport.receive().unwrap();
    let message = Message::decode(&second).unwrap();
    match message.content {
        Content::Advice(advice) => assert_eq!(advice.text, "regroup"),
        other => panic!("expected advice, got {:?}", other),
    }
    engine.join().unwrap();
}

/// Full session: the console deploys, the engine streams genome reports,
/// and the population tracker ends up with the right answer.
#[test]
fn test_engine_session_populates_tracker() {
    let (port, engine) = spawn_engine(|mut stream| {
        // Engine waits for the deploy command before reporting.
        let request = read_frame(&mut stream);
        let message = Message::decode(&request).unwrap();
        match message.content {
            Content::Command(cmd) => assert_eq!(cmd.command, "deploy"),
            other => panic!("expected command, got {:?}", other),
        }

        for report in [genome(10, 1, 5.0), genome(20, 2, 9.0), genome(30, 3, 2.0)] {
            write_frame(
                &mut stream,
                &Message::new(Content::Genome(report)).encode(),
            );
        }
        write_frame(
            &mut stream,
            &Message::new(Content::Advice(simbridge_core::Advice {
                text: "round complete".to_string(),
            }))
            .encode(),
        );
    });

    let transport = Transport::connect("127.0.0.1", port).unwrap();
    let mut population = Population::new();

    let deploy = Message::new(Content::Command(simbridge_core::Command {
        command: "deploy".to_string(),
        arg: String::new(),
    }));
    transport.send(&deploy.encode()).unwrap();

    // Consume reports until the engine signals the end of the round.
    loop {
        let text = transport.receive().unwrap();
        match Message::decode(&text).unwrap().content {
            Content::Genome(genome) => population.add(genome),
            Content::Advice(_) => break,
            other => panic!("unexpected content: {:?}", other),
        }
    }

    assert_eq!(population.size(), 3);
    assert_eq!(population.get_fittest().unwrap().id, 20);
    assert_eq!(transport.stats().frames_received, 4);
    engine.join().unwrap();
}

/// Re-inserting a body slot with a weaker genome changes the answer and
/// keeps the slot count stable, end to end through the codec.
#[test]
fn test_replacement_through_the_codec() {
    let reports = [
        genome(10, 1, 5.0),
        genome(20, 2, 9.0),
        genome(30, 3, 2.0),
        genome(21, 2, 1.0),
    ];

    let mut population = Population::new();
    for report in reports {
        let text = Message::new(Content::Genome(report)).encode();
        match Message::decode(&text).unwrap().content {
            Content::Genome(genome) => population.add(genome),
            other => panic!("expected genome, got {:?}", other),
        }
    }

    assert_eq!(population.size(), 3);
    assert_eq!(population.get_fittest().unwrap().id, 10);
}
