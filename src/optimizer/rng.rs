//! Small PRNG for picking among tied compositions. SplitMix64: same seed, same sequence.
//! Not cryptographically secure.

const SPLITMIX64_GOLDEN: u64 = 0x9e3779b97f4a7c15;
const SPLITMIX64_M1: u64 = 0xbf58476d1ce4e5b9;
const SPLITMIX64_M2: u64 = 0x94d049bb133111eb;

#[derive(Debug, Clone, Copy)]
pub struct Rng {
    state: u64,
}

impl Rng {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Seeds from the operating system, falling back to a fixed seed if it is unavailable.
    pub fn from_entropy() -> Self {
        let mut bytes = [0u8; 8];
        match getrandom::getrandom(&mut bytes) {
            Ok(()) => Self::new(u64::from_le_bytes(bytes)),
            Err(err) => {
                tracing::warn!(error = %err, "os entropy unavailable; using fixed seed");
                Self::new(SPLITMIX64_GOLDEN)
            }
        }
    }

    #[inline]
    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(SPLITMIX64_GOLDEN);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(SPLITMIX64_M1);
        z = (z ^ (z >> 27)).wrapping_mul(SPLITMIX64_M2);
        z ^ (z >> 31)
    }

    /// Uniform index in `0..len` by rejection sampling. `len` must be non-zero.
    pub fn below(&mut self, len: usize) -> usize {
        let len = len as u64;
        let zone = u64::MAX - u64::MAX % len;
        loop {
            let value = self.next_u64();
            if value < zone {
                return (value % len) as usize;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splitmix64_deterministic() {
        let mut a = Rng::new(7);
        let mut b = Rng::new(7);
        for _ in 0..100 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
    }

    #[test]
    fn below_stays_in_range_and_hits_every_index() {
        let mut rng = Rng::new(42);
        let mut hits = [0usize; 3];
        for _ in 0..300 {
            hits[rng.below(3)] += 1;
        }
        assert!(hits.iter().all(|count| *count > 0), "{hits:?}");
        assert_eq!(Rng::new(1).below(1), 0);
    }
}
