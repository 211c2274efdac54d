use std::{fmt, str::FromStr};

use rand::{
    Rng, SeedableRng as _,
    distr::{Distribution, StandardUniform},
};
use rand_pcg::Pcg32;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::core::shape::ShapeKind;

use super::config::ConfigError;

/// Seed for deterministic piece generation.
///
/// 128 bits, written as 32 hex digits. Two generators built from the same
/// seed and kind set produce the same sequence.
///
/// # Example
///
/// ```
/// use cascadris_engine::PieceSeed;
///
/// let seed: PieceSeed = "0123456789abcdef0123456789abcdef".parse().unwrap();
/// assert_eq!(seed.to_string(), "0123456789abcdef0123456789abcdef");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PieceSeed([u8; 16]);

#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("invalid seed {input:?}: expected 32 hex digits")]
pub struct SeedParseError {
    input: String,
}

impl From<u128> for PieceSeed {
    fn from(value: u128) -> Self {
        Self(value.to_be_bytes())
    }
}

impl fmt::Display for PieceSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", u128::from_be_bytes(self.0))
    }
}

impl FromStr for PieceSeed {
    type Err = SeedParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || SeedParseError { input: s.to_owned() };
        if s.len() != 32 || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(err());
        }
        u128::from_str_radix(s, 16)
            .map(Self::from)
            .map_err(|_| err())
    }
}

impl Serialize for PieceSeed {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PieceSeed {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex = String::deserialize(deserializer)?;
        hex.parse().map_err(serde::de::Error::custom)
    }
}

impl Distribution<PieceSeed> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PieceSeed {
        let mut seed = [0; 16];
        rng.fill(&mut seed);
        PieceSeed(seed)
    }
}

/// Picks the kind of each spawned piece uniformly at random from a fixed set.
///
/// No bag or history: every draw is independent.
#[derive(Debug, Clone)]
pub struct PieceGenerator {
    rng: Pcg32,
    kinds: Vec<ShapeKind>,
}

impl PieceGenerator {
    pub fn new(kinds: &[ShapeKind], seed: PieceSeed) -> Result<Self, ConfigError> {
        if kinds.is_empty() {
            return Err(ConfigError::EmptyPieceSet);
        }
        Ok(Self {
            rng: Pcg32::from_seed(seed.0),
            kinds: kinds.to_vec(),
        })
    }

    #[must_use]
    pub fn kinds(&self) -> &[ShapeKind] {
        &self.kinds
    }

    /// Restarts the sequence from `seed`.
    pub fn reseed(&mut self, seed: PieceSeed) {
        self.rng = Pcg32::from_seed(seed.0);
    }

    pub fn next_kind(&mut self) -> ShapeKind {
        self.kinds[self.rng.random_range(0..self.kinds.len())]
    }
}
