use crate::clock::Millis;
use crate::rng::RandomSource;

pub(crate) const STAR_COUNT: usize = 60;

// drift per loop, measured against a 1280x720 reference page
const DRIFT_X: f32 = 150.0 / 1280.0;
const DRIFT_Y: f32 = 20.0 / 720.0;
const FADE_EDGE: f32 = 0.1;

const LAYER_DELAY_MS: Millis = 500;
const LAYER_FADE_MS: Millis = 2_000;

#[derive(Clone, Copy, Debug)]
pub(crate) struct Star {
    // fractions of the viewport
    x: f32,
    y: f32,
    pub(crate) size: u8,
    peak: f32,
    period_ms: Millis,
    offset_ms: Millis,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct StarSample {
    pub(crate) x: f32,
    pub(crate) y: f32,
    pub(crate) alpha: f32,
}

impl Star {
    fn random(rng: &mut dyn RandomSource) -> Self {
        Self {
            y: rng.unit(),
            x: rng.range(-0.2, 1.0),
            size: if rng.unit() < 0.7 { 1 } else { 2 },
            peak: rng.range(0.2, 0.7),
            period_ms: rng.range_ms(20_000, 40_000),
            offset_ms: rng.range_ms(0, 20_000),
        }
    }

    /// Where the star is `t` ms into the animation, looping every period.
    pub(crate) fn sample(&self, t: Millis) -> StarSample {
        let phase = ((t + self.offset_ms) % self.period_ms) as f32 / self.period_ms as f32;
        let envelope = if phase < FADE_EDGE {
            phase / FADE_EDGE
        } else if phase > 1.0 - FADE_EDGE {
            (1.0 - phase) / FADE_EDGE
        } else {
            1.0
        };
        StarSample {
            x: self.x + DRIFT_X * phase,
            y: self.y + DRIFT_Y * phase,
            alpha: self.peak * envelope.clamp(0.0, 1.0),
        }
    }
}

pub(crate) struct Starfield {
    stars: Vec<Star>,
}

impl Starfield {
    pub(crate) fn generate(count: usize, rng: &mut dyn RandomSource) -> Self {
        Self {
            stars: (0..count).map(|_| Star::random(rng)).collect(),
        }
    }

    pub(crate) fn stars(&self) -> &[Star] {
        &self.stars
    }
}

/// Opacity of the whole layer `since` ms after boot handoff.
pub(crate) fn layer_alpha(since: Millis) -> f32 {
    let t = since.saturating_sub(LAYER_DELAY_MS) as f32 / LAYER_FADE_MS as f32;
    t.clamp(0.0, 1.0)
}
