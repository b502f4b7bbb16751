//! Genome reports and their fitness breakdown.
//!
//! The engine evaluates every agent along a fixed set of shaping dimensions
//! and reports the result as a `Genome`: which body slot the genome currently
//! occupies, its scalar fitness, and the per-dimension raw values behind that
//! scalar.
//!
//! # Invariant
//!
//! A `FitnessWeights` always holds a value for **all six** dimensions. Wire
//! payloads that carry a subset are filled with each dimension's declared
//! default at decode time, so no partially-populated instance ever exists in
//! memory.

use std::fmt;

use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::Deserialize;

/// The closed set of shaping dimensions the engine scores agents on.
///
/// The variant name doubles as the stable wire name; `label()` is the
/// human-readable form used for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    StandGround,
    StickTogether,
    ApproachEnemy,
    ApproachFlag,
    HitTarget,
    AvoidFire,
}

impl Dimension {
    /// All dimensions in declaration order.
    pub const ALL: [Dimension; 6] = [
        Dimension::StandGround,
        Dimension::StickTogether,
        Dimension::ApproachEnemy,
        Dimension::ApproachFlag,
        Dimension::HitTarget,
        Dimension::AvoidFire,
    ];

    /// Stable name used on the wire.
    pub fn wire_name(self) -> &'static str {
        match self {
            Dimension::StandGround => "StandGround",
            Dimension::StickTogether => "StickTogether",
            Dimension::ApproachEnemy => "ApproachEnemy",
            Dimension::ApproachFlag => "ApproachFlag",
            Dimension::HitTarget => "HitTarget",
            Dimension::AvoidFire => "AvoidFire",
        }
    }

    /// Human-readable label for display.
    pub fn label(self) -> &'static str {
        match self {
            Dimension::StandGround => "Stand Ground",
            Dimension::StickTogether => "Stick Together",
            Dimension::ApproachEnemy => "Approach Enemy",
            Dimension::ApproachFlag => "Approach Flag",
            Dimension::HitTarget => "Hit Target",
            Dimension::AvoidFire => "Avoid Fire",
        }
    }

    /// Declared default weight for this dimension.
    ///
    /// All six default to 0.0 today; the per-dimension hook exists so a
    /// dimension can declare a different baseline without touching decode.
    pub fn default_weight(self) -> f32 {
        0.0
    }

    /// Resolve a wire name back to a dimension.
    pub fn from_wire_name(name: &str) -> Option<Dimension> {
        Dimension::ALL.into_iter().find(|d| d.wire_name() == name)
    }

    fn index(self) -> usize {
        match self {
            Dimension::StandGround => 0,
            Dimension::StickTogether => 1,
            Dimension::ApproachEnemy => 2,
            Dimension::ApproachFlag => 3,
            Dimension::HitTarget => 4,
            Dimension::AvoidFire => 5,
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A complete table of per-dimension fitness values.
///
/// Constructed full: every dimension starts at its declared default and can
/// only be overwritten, never removed.
#[derive(Debug, Clone, PartialEq)]
pub struct FitnessWeights {
    weights: [f32; 6],
}

impl FitnessWeights {
    /// Create a table with every dimension at its declared default.
    pub fn new() -> Self {
        let mut weights = [0.0; 6];
        for dim in Dimension::ALL {
            weights[dim.index()] = dim.default_weight();
        }
        Self { weights }
    }

    /// Value for one dimension.
    pub fn get(&self, dim: Dimension) -> f32 {
        self.weights[dim.index()]
    }

    /// Overwrite the value for one dimension.
    pub fn set(&mut self, dim: Dimension, value: f32) {
        self.weights[dim.index()] = value;
    }

    /// Iterate `(dimension, value)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (Dimension, f32)> + '_ {
        Dimension::ALL.into_iter().map(|d| (d, self.get(d)))
    }
}

impl Default for FitnessWeights {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for FitnessWeights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (dim, value) in self.iter() {
            writeln!(f, "{}: {}", dim, value)?;
        }
        Ok(())
    }
}

impl<'de> Deserialize<'de> for FitnessWeights {
    /// Decode from a map of wire names to values.
    ///
    /// Missing dimensions keep their declared default; unknown keys are an
    /// error rather than being silently dropped.
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct WeightsVisitor;

        impl<'de> Visitor<'de> for WeightsVisitor {
            type Value = FitnessWeights;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of fitness dimension names to numbers")
            }

            fn visit_map<A>(self, mut map: A) -> std::result::Result<FitnessWeights, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut weights = FitnessWeights::new();
                while let Some(key) = map.next_key::<String>()? {
                    let dim = Dimension::from_wire_name(&key).ok_or_else(|| {
                        de::Error::custom(format!("unknown fitness dimension `{}`", key))
                    })?;
                    weights.set(dim, map.next_value::<f32>()?);
                }
                Ok(weights)
            }
        }

        deserializer.deserialize_map(WeightsVisitor)
    }
}

/// One reported agent: identity, body slot, and fitness breakdown.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Genome {
    /// Genome identity, unique within the evolving population
    pub id: i32,

    /// Body slot this genome currently occupies
    pub body_id: i32,

    /// Scalar fitness the engine assigned
    pub fitness: f32,

    /// Ticks this genome's body has been alive
    pub time_alive: i32,

    /// Engine marked this genome as a designated best-performer.
    /// Informational only; absent on the wire means false.
    #[serde(default)]
    pub champ: bool,

    /// Per-dimension values behind the scalar fitness
    pub raw_fitness: FitnessWeights,
}

impl fmt::Display for Genome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Genome(id: {}, bodyId: {}, fitness: {}, timeAlive: {})",
            self.id, self.body_id, self.fitness, self.time_alive
        )?;
        write!(f, "{}", self.raw_fitness)
    }
}
