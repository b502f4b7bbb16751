//! Local view of the remote evolving population.
//!
//! The engine runs a fixed number of bodies; every genome report assigns a
//! genome to a body slot, replacing whatever held that slot before. The
//! tracker keeps the latest genome per slot and answers "who is currently
//! fittest" with a lazily recomputed cache.
//!
//! # Thread Safety
//!
//! Not thread-safe on its own. When `add` and `get_fittest` run on
//! different threads, wrap the whole tracker in one `Mutex`; its state is
//! small and flat, so finer-grained locking buys nothing.

use std::collections::HashMap;

use crate::genome::Genome;

/// Latest genome per body slot, plus a cached fittest.
#[derive(Debug, Default)]
pub struct Population {
    /// Body slot -> most recently reported genome
    bodies: HashMap<i32, Genome>,

    /// Cache of the current maximum-fitness genome; `None` means stale
    /// and is recomputed on the next query
    fittest: Option<Genome>,
}

impl Population {
    /// Create an empty population.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a genome report, replacing the previous occupant of its body
    /// slot.
    ///
    /// Every insert invalidates the fittest cache, champion reports
    /// included: the champ flag is informational and logged, never a
    /// shortcut past recomputation.
    pub fn add(&mut self, genome: Genome) {
        if genome.champ {
            log::info!(
                "champion genome {} reported for body {}",
                genome.id,
                genome.body_id
            );
        }
        self.bodies.insert(genome.body_id, genome);
        self.fittest = None;
    }

    /// The genome with the current maximum fitness, or `None` when empty.
    ///
    /// Recomputes and caches on the first query after a mutation. Ties go
    /// to whichever tied genome the map iteration visits last; that order
    /// is implementation-defined. A NaN fitness never compares greater
    /// than a candidate, so a NaN genome only wins if it is visited first
    /// and nothing else beats it.
    pub fn get_fittest(&mut self) -> Option<&Genome> {
        if self.bodies.is_empty() {
            return None;
        }
        if self.fittest.is_none() {
            let mut best: Option<&Genome> = None;
            for genome in self.bodies.values() {
                let beats = match best {
                    None => true,
                    Some(current) => genome.fitness >= current.fitness,
                };
                if beats {
                    best = Some(genome);
                }
            }
            self.fittest = best.cloned();
        }
        self.fittest.as_ref()
    }

    /// Number of distinct body slots currently held.
    pub fn size(&self) -> usize {
        self.bodies.len()
    }

    /// Whether no genome has been reported yet.
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }
}
