//! Xorshift32 generator for obstacle placement.

pub struct Rng(u32);

impl Rng {
    /// Xorshift gets stuck at zero, so a zero seed is replaced.
    pub const fn new(seed: u32) -> Self {
        Self(if seed == 0 { 0x9E37_79B9 } else { seed })
    }

    pub fn next(&mut self) -> u32 {
        self.0 ^= self.0 << 13;
        self.0 ^= self.0 >> 17;
        self.0 ^= self.0 << 5;
        self.0
    }

    /// Uniform-ish value in `0..max`.
    pub fn range(&mut self, max: u32) -> u32 {
        self.next() % max
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_seed_still_produces_values() {
        let mut rng = Rng::new(0);
        assert_ne!(rng.next(), 0);
        assert_ne!(rng.next(), 0);
    }

    #[test]
    fn range_stays_in_bounds_and_covers_it() {
        let mut rng = Rng::new(1234);
        let mut seen = [false; 6];
        for _ in 0..600 {
            let v = rng.range(6);
            assert!(v < 6);
            seen[v as usize] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }
}
