use crate::clock::Millis;

fn bezier(t: f32, p1: f32, p2: f32) -> f32 {
    let u = 1.0 - t;
    3.0 * u * u * t * p1 + 3.0 * u * t * t * p2 + t * t * t
}

/// CSS-style cubic-bezier(x1, y1, x2, y2) evaluated at progress `x` in [0, 1].
pub(crate) fn cubic_bezier(x: f32, x1: f32, y1: f32, x2: f32, y2: f32) -> f32 {
    let x = x.clamp(0.0, 1.0);
    if x <= 0.0 || x >= 1.0 {
        return x;
    }
    // x(t) is monotonic for control points inside [0, 1]
    let (mut lo, mut hi) = (0.0f32, 1.0f32);
    let mut t = x;
    for _ in 0..32 {
        let bx = bezier(t, x1, x2);
        if (bx - x).abs() < 1e-5 {
            break;
        }
        if bx < x {
            lo = t;
        } else {
            hi = t;
        }
        t = 0.5 * (lo + hi);
    }
    bezier(t, y1, y2)
}

pub(crate) fn ease_in_out(x: f32) -> f32 {
    cubic_bezier(x, 0.42, 0.0, 0.58, 1.0)
}

pub(crate) fn circ_out(x: f32) -> f32 {
    let x = x.clamp(0.0, 1.0) - 1.0;
    (1.0 - x * x).sqrt()
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Vec2 {
    pub(crate) x: f32,
    pub(crate) y: f32,
}

impl Vec2 {
    pub(crate) const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub(crate) fn lerp(self, to: Vec2, t: f32) -> Vec2 {
        Vec2 {
            x: self.x + (to.x - self.x) * t,
            y: self.y + (to.y - self.y) * t,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct Tween {
    from: Vec2,
    to: Vec2,
    start: Millis,
    duration: Millis,
    ease: fn(f32) -> f32,
}

impl Tween {
    pub(crate) fn still(at: Vec2) -> Self {
        Self {
            from: at,
            to: at,
            start: 0,
            duration: 0,
            ease: circ_out,
        }
    }

    /// Starts a new tween from wherever this one currently is.
    pub(crate) fn retarget(
        &mut self,
        now: Millis,
        to: Vec2,
        duration: Millis,
        ease: fn(f32) -> f32,
    ) {
        self.from = self.sample(now);
        self.to = to;
        self.start = now;
        self.duration = duration;
        self.ease = ease;
    }

    pub(crate) fn sample(&self, now: Millis) -> Vec2 {
        if self.duration == 0 || now >= self.start + self.duration {
            return self.to;
        }
        let t = now.saturating_sub(self.start) as f32 / self.duration as f32;
        self.from.lerp(self.to, (self.ease)(t))
    }
}

/// Reveals `text` one character per `interval` starting at `start`.
#[derive(Clone, Debug)]
pub(crate) struct Typewriter {
    text: String,
    start: Millis,
    interval: Millis,
}

impl Typewriter {
    pub(crate) fn new(text: impl Into<String>, start: Millis, interval: Millis) -> Self {
        Self {
            text: text.into(),
            start,
            interval: interval.max(1),
        }
    }

    pub(crate) fn visible(&self, now: Millis) -> &str {
        let shown = (now.saturating_sub(self.start) / self.interval) as usize;
        match self.text.char_indices().nth(shown) {
            Some((byte, _)) => &self.text[..byte],
            None => &self.text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ease_in_out_is_symmetric_and_pinned() {
        assert_eq!(ease_in_out(0.0), 0.0);
        assert_eq!(ease_in_out(1.0), 1.0);
        assert!((ease_in_out(0.5) - 0.5).abs() < 1e-3);
        let a = ease_in_out(0.25);
        let b = ease_in_out(0.75);
        assert!((a + b - 1.0).abs() < 1e-3);
        assert!(a < 0.25);
    }

    #[test]
    fn circ_out_front_loads() {
        assert_eq!(circ_out(0.0), 0.0);
        assert_eq!(circ_out(1.0), 1.0);
        assert!(circ_out(0.3) > 0.3);
    }

    #[test]
    fn tween_retarget_starts_from_current_position() {
        let mut tw = Tween::still(Vec2::ZERO);
        tw.retarget(0, Vec2 { x: 4.0, y: 2.0 }, 600, circ_out);
        let mid = tw.sample(300);
        assert!(mid.x > 0.0 && mid.x < 4.0);
        tw.retarget(300, Vec2::ZERO, 500, ease_in_out);
        assert_eq!(tw.sample(300), mid);
        assert_eq!(tw.sample(800), Vec2::ZERO);
    }

    #[test]
    fn typewriter_reveals_per_interval() {
        let tw = Typewriter::new("Initializing...", 1000, 100);
        assert_eq!(tw.visible(0), "");
        assert_eq!(tw.visible(1000), "");
        assert_eq!(tw.visible(1100), "I");
        assert_eq!(tw.visible(1450), "Init");
        assert_eq!(tw.visible(2400), "Initializing..");
        assert_eq!(tw.visible(2500), "Initializing...");
        assert_eq!(tw.visible(99_999), "Initializing...");
    }

    #[test]
    fn typewriter_handles_multibyte_text() {
        let tw = Typewriter::new("hooman… why", 0, 30);
        assert_eq!(tw.visible(6 * 30), "hooman");
        assert_eq!(tw.visible(7 * 30), "hooman…");
    }
}
