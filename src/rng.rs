use rand::{rngs::StdRng, Rng, SeedableRng};

/// Source of uniform samples in `[0, 1)`.
///
/// Everything random in the companion and the starfield goes through this so
/// tests can replay exact sequences.
pub(crate) trait RandomSource {
    fn unit(&mut self) -> f32;

    fn range(&mut self, lo: f32, hi: f32) -> f32 {
        lo + (hi - lo) * self.unit()
    }

    fn range_ms(&mut self, lo: u64, hi: u64) -> u64 {
        let span = hi.saturating_sub(lo) as f32;
        let v = lo + (self.unit() * span) as u64;
        v.min(hi.saturating_sub(1)).max(lo)
    }

    fn pick(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        ((self.unit() * len as f32) as usize).min(len - 1)
    }
}

impl RandomSource for StdRng {
    fn unit(&mut self) -> f32 {
        self.gen::<f32>()
    }
}

pub(crate) fn seeded(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    }
}

/// Replays a fixed list of samples, cycling when it runs out.
#[cfg(test)]
pub(crate) struct Scripted {
    samples: Vec<f32>,
    at: usize,
}

#[cfg(test)]
impl Scripted {
    pub(crate) fn new(samples: &[f32]) -> Self {
        Self {
            samples: samples.to_vec(),
            at: 0,
        }
    }

    pub(crate) fn constant(v: f32) -> Self {
        Self::new(&[v])
    }
}

#[cfg(test)]
impl RandomSource for Scripted {
    fn unit(&mut self) -> f32 {
        let v = self.samples[self.at % self.samples.len()];
        self.at += 1;
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranges_stay_half_open() {
        let mut r = Scripted::new(&[0.0, 0.999_999, 0.5]);
        assert_eq!(r.range_ms(1500, 3500), 1500);
        assert_eq!(r.range_ms(1500, 3500), 3499);
        assert_eq!(r.range_ms(1500, 3500), 2500);
    }

    #[test]
    fn pick_never_overflows() {
        let mut r = Scripted::constant(0.999_999_9);
        assert_eq!(r.pick(11), 10);
        assert_eq!(r.pick(0), 0);
    }

    #[test]
    fn seeded_rng_is_reproducible() {
        let mut a = seeded(Some(7));
        let mut b = seeded(Some(7));
        for _ in 0..8 {
            assert_eq!(a.unit(), b.unit());
        }
    }
}
