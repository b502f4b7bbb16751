//! simbridge console: connects to the engine, tracks the population, and
//! lets an operator send commands, advice, and shaping weights.
//!
//! One thread blocks in `receive` and routes decoded content; the main
//! thread drives an interactive stdin loop. The two sides share the
//! transport (full-duplex) and the population tracker (one mutex).

mod config;

use std::io::{self, BufRead};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};

use simbridge_core::{
    Advice, Command, Content, Dimension, FitnessWeights, Message, Population, RecvError, Transport,
};

use crate::config::Config;

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = match Config::from_args(&args) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {}", err);
            eprintln!("run with --help for usage");
            std::process::exit(2);
        }
    };

    init_logging(config.debug);

    if config.print_config {
        config.print();
    }

    let transport =
        match Transport::connect_or_offline(&config.host, config.port, config.offline_echo) {
            Ok(transport) => transport,
            Err(err) => {
                eprintln!("error: {}", err);
                std::process::exit(1);
            }
        };

    if transport.is_offline() {
        println!("(offline: sends are echoed locally, nothing will be received)");
    }

    let transport = Arc::new(transport);
    let population = Arc::new(Mutex::new(Population::new()));

    let reader = spawn_reader(Arc::clone(&transport), Arc::clone(&population));

    run_console(&transport, &population);

    transport.close();
    let _ = reader.join();
}

fn init_logging(debug: bool) {
    let mut builder = env_logger::Builder::from_default_env();
    if debug {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.init();
}

/// Receive loop: every inbound frame is decoded and routed. Decode
/// failures drop the frame; transport failures end the loop.
fn spawn_reader(
    transport: Arc<Transport>,
    population: Arc<Mutex<Population>>,
) -> JoinHandle<()> {
    thread::spawn(move || loop {
        let text = match transport.receive() {
            Ok(text) => text,
            Err(RecvError::Offline) => return,
            Err(RecvError::InvalidUtf8(err)) => {
                log::warn!("dropping frame with undecodable body: {}", err);
                continue;
            }
            Err(RecvError::Disconnected) | Err(RecvError::Closed) => {
                log::info!("connection closed");
                return;
            }
            Err(err) => {
                log::warn!("connection lost: {}", err);
                return;
            }
        };

        let message = match Message::decode(&text) {
            Ok(message) => message,
            Err(err) => {
                log::warn!("dropping frame: {}", err);
                continue;
            }
        };

        match message.content {
            Content::Genome(genome) => {
                log::debug!("genome {} for body {}", genome.id, genome.body_id);
                lock(&population).add(genome);
            }
            Content::Advice(advice) => println!("[engine] {}", advice.text),
            Content::Command(command) => {
                log::info!("engine command: {} {}", command.command, command.arg)
            }
            Content::ErrorMessage(error) => log::error!("engine error: {}", error),
            Content::FitnessWeights(weights) => {
                println!("[engine] active shaping weights:");
                print!("{}", weights);
            }
        }
    })
}

fn run_console(transport: &Transport, population: &Mutex<Population>) {
    print_console_help();

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(_) => break,
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let (verb, rest) = match line.split_once(' ') {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };

        match verb {
            "quit" | "exit" => break,
            "help" => print_console_help(),
            "advice" => {
                if rest.is_empty() {
                    println!("usage: advice <text>");
                    continue;
                }
                send(
                    transport,
                    Content::Advice(Advice {
                        text: rest.to_string(),
                    }),
                );
            }
            "command" => {
                let (command, arg) = match rest.split_once(' ') {
                    Some((command, arg)) => (command, arg.trim()),
                    None => (rest, ""),
                };
                if command.is_empty() {
                    println!("usage: command <verb> [arg]");
                    continue;
                }
                send(
                    transport,
                    Content::Command(Command {
                        command: command.to_string(),
                        arg: arg.to_string(),
                    }),
                );
            }
            "weights" => match parse_weights(rest) {
                Ok(weights) => send(transport, Content::FitnessWeights(weights)),
                Err(err) => println!("{}", err),
            },
            "fittest" => {
                let mut population = lock(population);
                match population.get_fittest() {
                    Some(genome) => print!("{}", genome),
                    None => println!("no genomes reported yet"),
                }
            }
            "size" => println!("{} bodies tracked", lock(population).size()),
            "stats" => {
                let stats = transport.stats();
                println!(
                    "frames: {} sent / {} received, bytes: {} sent / {} received, offline echoes: {}",
                    stats.frames_sent,
                    stats.frames_received,
                    stats.bytes_sent,
                    stats.bytes_received,
                    stats.offline_echoes
                );
            }
            _ => println!("unknown command `{}`; try `help`", verb),
        }
    }
}

fn send(transport: &Transport, content: Content) {
    let text = Message::new(content).encode();
    if let Err(err) = transport.send(&text) {
        eprintln!("send failed: {}", err);
    }
}

/// Parse `Dimension=value` pairs into a full weight table; unnamed
/// dimensions keep their declared defaults.
fn parse_weights(input: &str) -> Result<FitnessWeights, String> {
    if input.is_empty() {
        return Err("usage: weights <Dimension>=<value> ...".to_string());
    }

    let mut weights = FitnessWeights::new();
    for pair in input.split_whitespace() {
        let (name, value) = pair
            .split_once('=')
            .ok_or_else(|| format!("expected Dimension=value, got `{}`", pair))?;
        let dim = Dimension::from_wire_name(name)
            .ok_or_else(|| format!("unknown dimension `{}`", name))?;
        let value: f32 = value
            .parse()
            .map_err(|_| format!("`{}` is not a number", value))?;
        weights.set(dim, value);
    }
    Ok(weights)
}

fn print_console_help() {
    println!("commands:");
    println!("    command <verb> [arg]            send a control command to the engine");
    println!("    advice <text>                   send coaching advice");
    println!("    weights <Dimension>=<value> ... send a shaping weight table");
    println!("    fittest                         show the current fittest genome");
    println!("    size                            show how many bodies are tracked");
    println!("    stats                           show transport traffic counters");
    println!("    help                            show this list");
    println!("    quit                            close the connection and exit");
}

fn lock(population: &Mutex<Population>) -> MutexGuard<'_, Population> {
    match population.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_weights_full_pair_list() {
        let weights = parse_weights("HitTarget=2.5 AvoidFire=-1").unwrap();
        assert_eq!(weights.get(Dimension::HitTarget), 2.5);
        assert_eq!(weights.get(Dimension::AvoidFire), -1.0);
        assert_eq!(weights.get(Dimension::StandGround), 0.0);
    }

    #[test]
    fn test_parse_weights_rejects_unknown_dimension() {
        assert!(parse_weights("ClimbTower=1").is_err());
    }

    #[test]
    fn test_parse_weights_rejects_bad_number() {
        assert!(parse_weights("HitTarget=lots").is_err());
    }

    #[test]
    fn test_parse_weights_rejects_empty_input() {
        assert!(parse_weights("").is_err());
    }
}
