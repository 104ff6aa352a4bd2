use crate::anim::{ease_in_out, Typewriter};
use crate::clock::Millis;
use tracing::info;

pub(crate) const BOOT_MS: Millis = 3_000;
pub(crate) const HANDOFF_DELAY_MS: Millis = 200;
pub(crate) const TITLE: &str = "Initializing...";
pub(crate) const TITLE_CHAR_MS: Millis = 100;

/// (time fraction, percent) keyframes. Pacing is deliberately uneven.
pub(crate) const KEYFRAMES: [(f32, f32); 9] = [
    (0.0, 0.0),
    (0.1, 15.0),
    (0.3, 28.0),
    (0.35, 35.0),
    (0.5, 60.0),
    (0.7, 75.0),
    (0.85, 82.0),
    (0.95, 98.0),
    (1.0, 100.0),
];

/// Progress in percent at `elapsed` ms into the boot.
pub(crate) fn progress_at(elapsed: Millis) -> f32 {
    let f = (elapsed as f32 / BOOT_MS as f32).clamp(0.0, 1.0);
    for pair in KEYFRAMES.windows(2) {
        let (t0, v0) = pair[0];
        let (t1, v1) = pair[1];
        if f <= t1 {
            let local = if t1 > t0 { (f - t0) / (t1 - t0) } else { 1.0 };
            return v0 + (v1 - v0) * ease_in_out(local);
        }
    }
    100.0
}

pub(crate) struct BootSequence {
    started: Millis,
    title: Typewriter,
    handed_off: bool,
}

impl BootSequence {
    pub(crate) fn start(now: Millis) -> Self {
        info!(at = now, "boot sequence started");
        Self {
            started: now,
            title: Typewriter::new(TITLE, now, TITLE_CHAR_MS),
            handed_off: false,
        }
    }

    pub(crate) fn progress(&self, now: Millis) -> f32 {
        progress_at(now.saturating_sub(self.started))
    }

    /// Rounded percentage as displayed next to the bar.
    pub(crate) fn percent(&self, now: Millis) -> u32 {
        self.progress(now).round() as u32
    }

    pub(crate) fn title(&self, now: Millis) -> &str {
        self.title.visible(now)
    }

    #[cfg(test)]
    pub(crate) fn is_finished(&self) -> bool {
        self.handed_off
    }

    /// Returns `true` exactly once, on the first poll at or after the handoff
    /// point. Later polls return `false`.
    pub(crate) fn poll(&mut self, now: Millis) -> bool {
        if self.handed_off {
            return false;
        }
        if now.saturating_sub(self.started) < BOOT_MS + HANDOFF_DELAY_MS {
            return false;
        }
        self.handed_off = true;
        info!(at = now, "boot sequence complete");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_starts_at_zero_and_ends_at_hundred() {
        assert_eq!(progress_at(0), 0.0);
        assert_eq!(progress_at(BOOT_MS), 100.0);
        assert_eq!(progress_at(BOOT_MS * 4), 100.0);
    }

    #[test]
    fn progress_hits_each_keyframe() {
        for (t, v) in KEYFRAMES {
            let ms = (t * BOOT_MS as f32).round() as Millis;
            assert!(
                (progress_at(ms) - v).abs() < 0.05,
                "at {ms}ms expected {v}, got {}",
                progress_at(ms)
            );
        }
    }

    #[test]
    fn progress_never_goes_backwards() {
        let mut last = 0.0;
        for ms in (0..=BOOT_MS).step_by(10) {
            let p = progress_at(ms);
            assert!(p + 1e-3 >= last, "dropped at {ms}ms");
            last = p;
        }
    }

    #[test]
    fn completion_fires_once_in_window() {
        let mut boot = BootSequence::start(500);
        let mut fired_at = Vec::new();
        for now in (500..6_000).step_by(16) {
            if boot.poll(now) {
                fired_at.push(now);
            }
        }
        assert_eq!(fired_at.len(), 1);
        let after = fired_at[0] - 500;
        assert!((BOOT_MS..BOOT_MS + 300).contains(&after), "fired {after}ms in");
        assert!(boot.is_finished());
        assert!(!boot.poll(10_000));
    }

    #[test]
    fn title_types_out_over_boot() {
        let boot = BootSequence::start(0);
        assert_eq!(boot.title(0), "");
        assert_eq!(boot.title(300), "Ini");
        assert_eq!(boot.title(BOOT_MS), TITLE);
        assert_eq!(boot.percent(BOOT_MS / 2), 60);
    }
}
