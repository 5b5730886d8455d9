//! Deterministic seeding: `seed_rng(input, pepper)` must return the same RNG
//! state for the same `(input, pepper)` pair across runs and processes —
//! this is what makes every transformer pure given `(input, pepper)`.

use rand::rngs::SmallRng;
use rand::SeedableRng;

/// Hashes `bytes` down to a 64-bit seed via the first 8 bytes of its MD5
/// digest, read big-endian.
pub fn hash_seed(bytes: &[u8]) -> u64 {
    let digest = md5::compute(bytes);
    u64::from_be_bytes(digest.0[0..8].try_into().unwrap())
}

/// Builds a seeded, deterministic RNG from `input` concatenated with
/// `pepper`.
pub fn seeded_rng(input: &[u8], pepper: &[u8]) -> SmallRng {
    let mut key = Vec::with_capacity(input.len() + pepper.len());
    key.extend_from_slice(input);
    key.extend_from_slice(pepper);
    SmallRng::seed_from_u64(hash_seed(&key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn same_input_and_pepper_give_same_seed() {
        let mut a = seeded_rng(b"hello", b"pepper");
        let mut b = seeded_rng(b"hello", b"pepper");
        assert_eq!(a.gen::<u64>(), b.gen::<u64>());
    }

    #[test]
    fn different_pepper_gives_different_seed() {
        let mut a = seeded_rng(b"hello", b"pepper-a");
        let mut b = seeded_rng(b"hello", b"pepper-b");
        assert_ne!(a.gen::<u64>(), b.gen::<u64>());
    }
}
