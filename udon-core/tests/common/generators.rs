//! Stochastic content generators for test variations
//!
//! Uses seeded RNG for reproducibility. Print seed on failure for replay.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Seeded generator for reproducible stochastic tests
pub struct Gen {
    pub rng: StdRng,
    pub seed: u64,
}

impl Gen {
    /// Create with specific seed (for reproduction)
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            seed,
        }
    }

    /// Create from `UDON_TEST_SEED` or a random seed
    pub fn from_env_or_random() -> Self {
        let seed = std::env::var("UDON_TEST_SEED")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(rand::random);
        Self::new(seed)
    }

    /// Variations per case: `UDON_TEST_COUNT`, else Poisson(λ=3), at least 1
    pub fn variation_count(&mut self) -> usize {
        std::env::var("UDON_TEST_COUNT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(|| self.poisson(3.0).max(1))
    }

    /// Geometric distribution: count until rand > alpha
    /// Returns 0, 1, 2, ... with decreasing probability
    pub fn geometric(&mut self, alpha: f64) -> usize {
        let mut n = 0;
        while self.rng.gen::<f64>() < alpha {
            n += 1;
        }
        n
    }

    /// Poisson-like count (simplified)
    pub fn poisson(&mut self, lambda: f64) -> usize {
        let l = (-lambda).exp();
        let mut k = 0;
        let mut p = 1.0;
        loop {
            k += 1;
            p *= self.rng.gen::<f64>();
            if p <= l {
                break;
            }
        }
        k - 1
    }

    /// Random boolean with probability p
    pub fn chance(&mut self, p: f64) -> bool {
        self.rng.gen::<f64>() < p
    }

    /// Random label: a letter, then letters, digits, `-` and `_`
    pub fn name(&mut self) -> Vec<u8> {
        let len = 1 + self.geometric(0.7);
        let mut name = Vec::with_capacity(len);
        name.push(self.rng.gen_range(b'a'..=b'z'));
        let chars = b"abcdefghijklmnopqrstuvwxyz0123456789-_";
        for _ in 1..len {
            name.push(chars[self.rng.gen_range(0..chars.len())]);
        }
        name
    }

    /// Random bare value (no spaces, no structural chars)
    pub fn bare_value(&mut self) -> Vec<u8> {
        let len = 1 + self.geometric(0.8);
        let chars = b"abcdefghijklmnopqrstuvwxyz0123456789-_.";
        let mut val = Vec::with_capacity(len);
        for _ in 0..len {
            val.push(chars[self.rng.gen_range(0..chars.len())]);
        }
        val
    }

    /// Random integer literal
    pub fn integer(&mut self) -> Vec<u8> {
        let val: i32 = self.rng.gen_range(-9999..9999);
        val.to_string().into_bytes()
    }

    /// Random valid UDON element line (for context wrapping)
    pub fn udon_fragment(&mut self, base_indent: usize) -> Vec<u8> {
        let mut out = vec![b' '; base_indent];
        out.push(b'|');
        out.extend(self.name());

        // Maybe add a class
        if self.chance(0.2) {
            out.push(b'.');
            out.extend(self.name());
        }

        // Maybe add an attribute
        if self.chance(0.3) {
            out.extend(b" :");
            out.extend(self.name());
            out.push(b' ');
            if self.chance(0.5) {
                out.extend(self.integer());
            } else {
                out.extend(self.bare_value());
            }
        }

        // Maybe add prose
        if self.chance(0.3) {
            out.extend(b" some prose here");
        }

        out.push(b'\n');
        out
    }

    /// Add random indent (geometric, α=0.9)
    pub fn indent_level(&mut self) -> usize {
        self.geometric(0.9) * 2 // 2 spaces per level
    }

    /// Inject random blank lines
    pub fn blank_lines(&mut self) -> Vec<u8> {
        let count = self.geometric(0.1); // Usually 0
        vec![b'\n'; count]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reproducibility() {
        let mut g1 = Gen::new(42);
        let mut g2 = Gen::new(42);

        for _ in 0..10 {
            assert_eq!(g1.name(), g2.name());
            assert_eq!(g1.udon_fragment(2), g2.udon_fragment(2));
        }
    }

    #[test]
    fn test_geometric_distribution() {
        let mut gen = Gen::new(12345);
        let samples: Vec<usize> = (0..1000).map(|_| gen.geometric(0.9)).collect();

        // With α=0.9, we expect mean ≈ 9 (geometric mean = α/(1-α))
        let mean: f64 = samples.iter().sum::<usize>() as f64 / samples.len() as f64;
        assert!(mean > 5.0 && mean < 15.0, "Mean {} out of expected range", mean);
    }
}
