//! Request-scoped deterministic random source.
//!
//! Every poster request builds its own [`Xorshift64`] from the request seed and
//! threads it by `&mut` through palette sampling, blob generation and layer
//! placement. Nothing is global, so concurrent requests never interfere and
//! the same seed always yields the same draw sequence on every platform.

/// Xorshift64 PRNG (shifts 13, 7, 17). Same seed, same sequence.
#[derive(Debug, Clone)]
pub struct Xorshift64 {
    state: u64,
}

impl Xorshift64 {
    /// Replaces a zero seed, which is a fixed point of xorshift.
    const FALLBACK_SEED: u64 = 0x5EED_DEAD_BEEF_CAFE;

    /// Creates a new PRNG with the given seed.
    ///
    /// Seed 0 is valid for posters, so it is mapped to `0x5EED_DEAD_BEEF_CAFE`
    /// instead of being rejected.
    pub fn new(seed: u64) -> Self {
        Self {
            state: if seed == 0 { Self::FALLBACK_SEED } else { seed },
        }
    }

    /// Creates a PRNG from a small user-facing seed (e.g. 0..=9999).
    ///
    /// Raw xorshift on tiny seeds yields tiny first outputs, which would pin
    /// the first layers of every poster near the origin. The seed is run
    /// through one splitmix64 round first so that neighbouring seeds start
    /// from unrelated states.
    pub fn seeded(seed: u64) -> Self {
        let mut z = seed.wrapping_add(0x9E37_79B9_7F4A_7C15);
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        Self::new(z ^ (z >> 31))
    }

    /// Advances the state and returns the next 64-bit value.
    pub fn next_u64(&mut self) -> u64 {
        self.state ^= self.state << 13;
        self.state ^= self.state >> 7;
        self.state ^= self.state << 17;
        self.state
    }

    /// Returns a uniformly distributed f64 in [0, 1).
    ///
    /// Uses the upper 53 bits of `next_u64()` for full mantissa precision.
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Returns a uniformly distributed f64 in [min, max).
    ///
    /// A degenerate range (`min == max`) still consumes one draw so that the
    /// sequence length does not depend on the range values.
    pub fn next_range(&mut self, min: f64, max: f64) -> f64 {
        min + self.next_f64() * (max - min)
    }

    /// Returns a uniformly distributed usize in [0, max).
    ///
    /// # Panics
    ///
    /// Panics if `max` is 0.
    pub fn next_usize(&mut self, max: usize) -> usize {
        (self.next_u64() as usize) % max
    }

    /// Coin flip that succeeds with probability `1 - threshold`.
    ///
    /// Draws one value and returns `true` when it exceeds `threshold`.
    pub fn next_above(&mut self, threshold: f64) -> bool {
        self.next_f64() > threshold
    }

    /// Picks a uniformly random element, or `None` for an empty slice.
    ///
    /// No draw is consumed for an empty slice.
    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        Some(&items[self.next_usize(items.len())])
    }
}
