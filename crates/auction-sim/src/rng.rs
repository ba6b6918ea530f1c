//! Per-round seeded randomness.

use auction_core::PropertySeed;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::SimError;

/// Stream label for competitor bids.
pub const BIDS_STREAM: &str = "competitor-bids";

/// ChaCha8 stream keyed by a label and the canonical JSON of a property seed.
///
/// Equal seeds give equal streams on every platform; different labels give
/// independent streams for the same seed.
#[derive(Clone, Debug)]
pub struct RoundRng(ChaCha8Rng);

impl RoundRng {
    pub fn for_seed(label: &str, seed: &PropertySeed) -> Result<Self, SimError> {
        Ok(Self::from_key(stream_key(label, seed)?))
    }

    pub fn from_key(key: u64) -> Self {
        RoundRng(ChaCha8Rng::seed_from_u64(key))
    }
}

/// First 8 bytes of `blake3(label ‖ 0 ‖ json(seed))`, little endian.
pub fn stream_key(label: &str, seed: &PropertySeed) -> Result<u64, SimError> {
    let json = serde_json::to_vec(seed)?;
    let mut hasher = blake3::Hasher::new();
    hasher.update(label.as_bytes());
    hasher.update(&[0]);
    hasher.update(&json);
    let digest = hasher.finalize();
    let mut key = [0u8; 8];
    key.copy_from_slice(&digest.as_bytes()[..8]);
    Ok(u64::from_le_bytes(key))
}

impl RngCore for RoundRng {
    fn next_u32(&mut self) -> u32 {
        self.0.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.0.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.0.fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.0.try_fill_bytes(dest)
    }
}
