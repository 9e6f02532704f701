//! Random memos.
//!
//! Every generated transfer carries a short random memo so that otherwise
//! identical transfers hash differently and can be told apart in a block
//! explorer. The memo means nothing to the chain and is not
//! cryptographically significant: uniform over a 62-symbol alphabet,
//! re-drawn on every call, collisions possible but vanishingly unlikely
//! (62^-10 for the default length).

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::fmt;

use crate::config::MEMO_CHARSET;

/// Draw `length` characters uniformly from [`MEMO_CHARSET`].
pub fn random_memo<R: Rng + ?Sized>(rng: &mut R, length: usize) -> String {
    (0..length)
        .map(|_| MEMO_CHARSET[rng.gen_range(0..MEMO_CHARSET.len())] as char)
        .collect()
}

/// `true` if `memo` has exactly `length` characters, all from the alphabet.
pub fn is_valid_memo(memo: &str, length: usize) -> bool {
    memo.len() == length && memo.bytes().all(|b| MEMO_CHARSET.contains(&b))
}

/// Thread-safe memo source with an injectable RNG.
///
/// Each client owns its generator. The mutex only matters when one client
/// is itself shared between threads; it keeps each draw atomic.
///
/// ```
/// use ledger_loadtest::memo::{is_valid_memo, MemoGenerator};
///
/// let a = MemoGenerator::seeded(7);
/// let b = MemoGenerator::seeded(7);
/// let memo = a.generate(10);
/// assert!(is_valid_memo(&memo, 10));
/// assert_eq!(memo, b.generate(10));
/// ```
pub struct MemoGenerator {
    rng: Mutex<Box<dyn RngCore + Send>>,
}

impl MemoGenerator {
    /// Generator seeded from OS entropy. The default for real runs.
    pub fn from_entropy() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Deterministic generator for reproducible runs and tests.
    pub fn seeded(seed: u64) -> Self {
        Self::seeded_stream(seed, 0)
    }

    /// Deterministic generator on ChaCha stream `stream` of `seed`.
    /// Distinct streams of one seed never overlap.
    pub fn seeded_stream(seed: u64, stream: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        rng.set_stream(stream);
        Self::with_rng(rng)
    }

    /// Generator backed by any RNG.
    pub fn with_rng<R: RngCore + Send + 'static>(rng: R) -> Self {
        Self {
            rng: Mutex::new(Box::new(rng)),
        }
    }

    /// Draw a fresh memo of `length` characters.
    pub fn generate(&self, length: usize) -> String {
        let mut rng = self.rng.lock();
        random_memo(rng.as_mut(), length)
    }
}

// ---------------------------------------------------------------------------
// MemoSeed
// ---------------------------------------------------------------------------

/// How each client's [`MemoGenerator`] is seeded.
///
/// A factory holds one `MemoSeed` and builds a fresh generator per client,
/// numbering clients in creation order. With a fixed seed, the `n`th client
/// of a run always draws the same memos no matter how calls from other
/// clients interleave with its own.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MemoSeed {
    /// Every client seeded independently from OS entropy.
    #[default]
    Entropy,
    /// Client `n` uses stream `n` of this ChaCha seed.
    Fixed(u64),
}

impl MemoSeed {
    /// Generator for the client numbered `stream`.
    pub fn generator(self, stream: u64) -> MemoGenerator {
        match self {
            MemoSeed::Entropy => MemoGenerator::from_entropy(),
            MemoSeed::Fixed(seed) => MemoGenerator::seeded_stream(seed, stream),
        }
    }
}

impl From<Option<u64>> for MemoSeed {
    fn from(seed: Option<u64>) -> Self {
        seed.map_or(MemoSeed::Entropy, MemoSeed::Fixed)
    }
}

impl Default for MemoGenerator {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl fmt::Debug for MemoGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MemoGenerator")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_MEMO_LENGTH;
    use std::collections::HashSet;

    #[test]
    fn memo_has_requested_length_and_alphabet() {
        let generator = MemoGenerator::from_entropy();
        for len in [1, DEFAULT_MEMO_LENGTH, 64] {
            let memo = generator.generate(len);
            assert!(is_valid_memo(&memo, len), "bad memo {:?}", memo);
        }
    }

    #[test]
    fn zero_length_memo_is_empty() {
        assert_eq!(MemoGenerator::seeded(1).generate(0), "");
    }

    #[test]
    fn seeded_generators_agree() {
        let a = MemoGenerator::seeded(42);
        let b = MemoGenerator::seeded(42);
        for _ in 0..5 {
            assert_eq!(a.generate(10), b.generate(10));
        }
    }

    #[test]
    fn different_seeds_diverge() {
        assert_ne!(
            MemoGenerator::seeded(1).generate(10),
            MemoGenerator::seeded(2).generate(10)
        );
    }

    #[test]
    fn successive_memos_differ() {
        let generator = MemoGenerator::seeded(9);
        let memos: HashSet<String> = (0..1000).map(|_| generator.generate(10)).collect();
        assert_eq!(memos.len(), 1000);
    }

    #[test]
    fn all_symbols_reachable() {
        let generator = MemoGenerator::seeded(3);
        let seen: HashSet<u8> = generator.generate(10_000).into_bytes().into_iter().collect();
        assert_eq!(seen.len(), MEMO_CHARSET.len());
    }

    #[test]
    fn streams_of_one_seed_diverge() {
        let a = MemoSeed::Fixed(5).generator(0);
        let b = MemoSeed::Fixed(5).generator(1);
        assert_ne!(a.generate(10), b.generate(10));
    }

    #[test]
    fn stream_zero_matches_seeded() {
        assert_eq!(
            MemoSeed::Fixed(8).generator(0).generate(10),
            MemoGenerator::seeded(8).generate(10)
        );
    }

    #[test]
    fn memo_seed_from_option() {
        assert_eq!(MemoSeed::from(None), MemoSeed::Entropy);
        assert_eq!(MemoSeed::from(Some(3)), MemoSeed::Fixed(3));
        assert!(is_valid_memo(&MemoSeed::Entropy.generator(9).generate(10), 10));
    }

    #[test]
    fn random_memo_accepts_any_rng() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let memo = random_memo(&mut rng, 10);
        assert!(is_valid_memo(&memo, 10));
    }

    #[test]
    fn is_valid_memo_rejects_outsiders() {
        assert!(!is_valid_memo("abc", 10));
        assert!(!is_valid_memo("abcdefghi!", 10));
        assert!(is_valid_memo("abcDEF0123", 10));
    }
}
