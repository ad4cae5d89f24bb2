//! Deterministic pseudo-random source.
//!
//! A small linear congruential generator used for organic jitter, particle
//! placement, and texture scatter. It is reproducible for a given seed and
//! call sequence, and is never used for anything security relevant.
//!
//! Draw functions create one generator per call with [`Prng::for_frame`],
//! which mixes the preset's `seed` parameter with the frame time. Rendering
//! the same parameters at the same time therefore always produces the same
//! scatter.

const MULTIPLIER: u64 = 9301;
const INCREMENT: u64 = 49297;
const MODULUS: u64 = 233_280;

/// Seed material: either a string (hashed) or a number (used directly).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Seed<'a> {
    Text(&'a str),
    Number(f64),
}

impl<'a> From<&'a str> for Seed<'a> {
    fn from(s: &'a str) -> Self {
        Seed::Text(s)
    }
}

impl From<f64> for Seed<'_> {
    fn from(n: f64) -> Self {
        Seed::Number(n)
    }
}

impl From<u32> for Seed<'_> {
    fn from(n: u32) -> Self {
        Seed::Number(n as f64)
    }
}

/// Seeded linear congruential generator yielding floats in `[0, 1)`.
#[derive(Debug, Clone)]
pub struct Prng {
    state: u64,
}

impl Prng {
    /// Creates a generator from a string or numeric seed.
    pub fn new<'a>(seed: impl Into<Seed<'a>>) -> Self {
        let raw = match seed.into() {
            Seed::Text(text) => hash_str(text) as i64,
            Seed::Number(n) if n.is_finite() => n.trunc() as i64,
            Seed::Number(_) => 0,
        };
        Self {
            state: raw.rem_euclid(MODULUS as i64) as u64,
        }
    }

    /// Creates the single generator a draw call is allowed to use.
    ///
    /// The seed string is hashed and the frame time folded in, so a given
    /// `(seed, time)` pair always reproduces the same sequence.
    pub fn for_frame(seed: &str, time: f64) -> Self {
        let time_bits = if time.is_finite() { time.to_bits() } else { 0 };
        let folded = (time_bits ^ (time_bits >> 32)) as u32 as i64;
        let raw = (hash_str(seed) as i64).wrapping_add(folded);
        Self {
            state: raw.rem_euclid(MODULUS as i64) as u64,
        }
    }

    /// Returns the next float in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        self.state = (self.state * MULTIPLIER + INCREMENT) % MODULUS;
        self.state as f64 / MODULUS as f64
    }

    /// Returns a float in `[min, max)`.
    pub fn range(&mut self, min: f64, max: f64) -> f64 {
        min + self.next_f64() * (max - min)
    }

    /// Returns a centered jitter in `[-0.5, 0.5)`.
    pub fn signed(&mut self) -> f64 {
        self.next_f64() - 0.5
    }

    /// Returns true with the given probability.
    pub fn chance(&mut self, probability: f64) -> bool {
        self.next_f64() < probability
    }
}

/// Rolling `h * 31 + c` string hash in 32-bit wrapping arithmetic.
fn hash_str(text: &str) -> i32 {
    text.encode_utf16().fold(0i32, |hash, unit| {
        hash.wrapping_shl(5).wrapping_sub(hash).wrapping_add(unit as i32)
    })
}
