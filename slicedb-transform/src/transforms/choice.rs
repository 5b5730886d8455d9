//! Shared "pick one deterministically" helper used by every list-backed
//! transformer.

use crate::seed::seeded_rng;
use rand::Rng;

pub struct Choice {
    options: Vec<String>,
}

impl Choice {
    pub fn new(options: &[&str]) -> Self {
        Choice {
            options: options.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn from_strings(options: Vec<String>) -> Self {
        Choice { options }
    }

    /// Picks an option deterministically from `input` and `pepper`.
    pub fn choose(&self, input: &str, pepper: &[u8]) -> &str {
        let mut rng = seeded_rng(input.as_bytes(), pepper);
        let index = rng.gen_range(0..self.options.len());
        &self.options[index]
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn choice_is_deterministic() {
        let choice = Choice::new(&["a", "b", "c", "d", "e"]);
        assert_eq!(
            choice.choose("x", b"pepper"),
            choice.choose("x", b"pepper")
        );
    }
}
