//! 64-bit SimHash over a token stream.
//!
//! Every token is hashed to 64 bits with a seeded xxh3. For each bit position
//! a counter gets +1 when the token hash has the bit set and -1 otherwise;
//! the output bit is set iff the final counter is positive. Texts sharing
//! most of their tokens end up a small Hamming distance apart.

use std::fmt;

use serde::{Deserialize, Serialize};
use xxhash_rust::xxh3::xxh3_64_with_seed;

/// A fixed-width SimHash signature.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SimHash(pub u64);

impl SimHash {
    /// Signature width in bits; independent of input size.
    pub const BITS: u32 = 64;

    /// Compute the signature of a token sequence. An empty sequence yields
    /// the all-zero signature.
    pub fn from_tokens<S: AsRef<str>>(tokens: &[S], seed: u64) -> Self {
        let mut acc = [0i64; Self::BITS as usize];
        for token in tokens {
            let h = hash_token(token.as_ref(), seed);
            for (bit, slot) in acc.iter_mut().enumerate() {
                if (h >> bit) & 1 == 1 {
                    *slot += 1;
                } else {
                    *slot -= 1;
                }
            }
        }

        let mut out = 0u64;
        for (bit, &sum) in acc.iter().enumerate() {
            if sum > 0 {
                out |= 1u64 << bit;
            }
        }
        SimHash(out)
    }

    /// Hamming distance between two signatures (XOR + popcount).
    #[inline]
    pub fn hamming_distance(self, other: Self) -> u32 {
        (self.0 ^ other.0).count_ones()
    }

    /// `1 - hamming_distance / 64`, always in [0, 1].
    #[inline]
    pub fn similarity(self, other: Self) -> f64 {
        1.0 - f64::from(self.hamming_distance(other)) / f64::from(Self::BITS)
    }

    #[inline]
    pub fn bits(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SimHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Seeded 64-bit token hash used as the SimHash feature hash.
#[inline]
pub fn hash_token(token: &str, seed: u64) -> u64 {
    xxh3_64_with_seed(token.as_bytes(), seed)
}
