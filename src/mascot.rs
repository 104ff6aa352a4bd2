//! Mood state machine for the companion cat.
//!
//! [`MascotState::step`] is pure: it takes the current state and one event and
//! returns the next state plus the timer effects the controller has to apply.
//! Nothing in here knows about wall time beyond the tap timestamps it is given.

use crate::anim::Vec2;
use crate::clock::Millis;
use crate::rng::RandomSource;

pub(crate) const RAPID_TAP_MS: Millis = 400;
pub(crate) const INACTIVITY_MS: Millis = 8_000;
pub(crate) const ANGRY_MS: Millis = 5_000;
pub(crate) const DIZZY_MS: Millis = 4_500;
pub(crate) const DIZZY_TOTAL_MS: Millis = 5_000;
pub(crate) const MESSAGE_MS: Millis = 2_500;
pub(crate) const TAP_RESET_MS: Millis = 1_500;
pub(crate) const BLINK_MS: Millis = 150;
pub(crate) const FIRST_BLINK_MS: Millis = 2_000;
pub(crate) const BLINK_GAP_MS: (Millis, Millis) = (2_000, 5_000);
pub(crate) const LOOK_GAP_MS: (Millis, Millis) = (1_500, 3_500);

pub(crate) const ANGRY_TAPS: u32 = 6;
pub(crate) const DIZZY_TAPS: u32 = 4;

/// Half-extents of the box the face wanders in while idle.
pub(crate) const LOOK_BOX: (f32, f32) = (4.0, 3.0);

pub(crate) const WAKE_MESSAGE: &str = "system online.";
pub(crate) const ANGRY_MESSAGE: &str = "angy";
pub(crate) const DIZZY_MESSAGE: &str = "calibration lost...";

pub(crate) const TAP_MESSAGES: [&str; 11] = [
    "hooman… why tap?",
    "nyahaha, that tickled.",
    "nya~ you found my button.",
    "grrrnyaa.",
    "boop denied.",
    "i allow one boop, hooman.",
    "puny hooman, stop this!",
    "meow? no.",
    "purr...haps later.",
    "do not disturb the floof.",
    "my whiskers detect cringe.",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Mood {
    Idle,
    Sleeping,
    Dizzy,
    DizzyRecover,
    Angry,
}

impl Mood {
    /// Moods during which the cat must not fall asleep.
    pub(crate) fn is_emotional(self) -> bool {
        matches!(self, Mood::Angry | Mood::Dizzy | Mood::DizzyRecover)
    }

    pub(crate) fn can_blink(self) -> bool {
        !matches!(self, Mood::Sleeping | Mood::Dizzy | Mood::DizzyRecover)
    }

    pub(crate) fn label(self) -> &'static str {
        match self {
            Mood::Idle => "idle",
            Mood::Sleeping => "sleeping",
            Mood::Dizzy => "dizzy",
            Mood::DizzyRecover => "dizzy-recover",
            Mood::Angry => "angry",
        }
    }
}

/// Named timer slots. Each one has at most one pending deadline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) enum TimerKind {
    Inactivity,
    Angry,
    Dizzy,
    Recover,
    MessageClear,
    TapReset,
    Look,
    Blink,
    BlinkEnd,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Event {
    Mount,
    Tap(Millis),
    Fired(TimerKind),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Effect {
    Arm(TimerKind, Millis),
    Cancel(TimerKind),
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct MascotState {
    pub(crate) mood: Mood,
    pub(crate) message: String,
    pub(crate) tap_count: u32,
    pub(crate) last_tap: Option<Millis>,
    pub(crate) face: Vec2,
    pub(crate) blink: bool,
}

impl Default for MascotState {
    fn default() -> Self {
        Self {
            mood: Mood::Idle,
            message: String::new(),
            tap_count: 0,
            last_tap: None,
            face: Vec2::ZERO,
            blink: false,
        }
    }
}

/// Rapid taps accumulate; anything slower starts a fresh streak.
pub(crate) fn classify_tap(count: u32, last_tap: Option<Millis>, now: Millis) -> u32 {
    match last_tap {
        Some(prev) if now.saturating_sub(prev) < RAPID_TAP_MS => count + 1,
        _ => 1,
    }
}

impl MascotState {
    pub(crate) fn step(
        &self,
        event: Event,
        rng: &mut dyn RandomSource,
    ) -> (MascotState, Vec<Effect>) {
        let mut next = self.clone();
        let mut fx = Vec::new();
        match event {
            Event::Mount => {
                next.arm_inactivity(&mut fx);
                fx.push(Effect::Arm(TimerKind::Blink, FIRST_BLINK_MS));
            }
            Event::Tap(at) => next.on_tap(at, rng, &mut fx),
            Event::Fired(kind) => next.on_timer(kind, rng, &mut fx),
        }
        next.track_idle_motion(self.mood, event, rng, &mut fx);
        (next, fx)
    }

    fn on_tap(&mut self, at: Millis, rng: &mut dyn RandomSource, fx: &mut Vec<Effect>) {
        match self.mood {
            Mood::Angry => return,
            Mood::Sleeping => {
                self.mood = Mood::Idle;
                // stays up until the next tap replaces it or sleep clears it
                self.message = WAKE_MESSAGE.to_string();
                fx.push(Effect::Cancel(TimerKind::MessageClear));
                self.arm_inactivity(fx);
                return;
            }
            _ => {}
        }

        self.tap_count = classify_tap(self.tap_count, self.last_tap, at);
        self.last_tap = Some(at);
        fx.push(Effect::Cancel(TimerKind::TapReset));

        if self.tap_count >= ANGRY_TAPS {
            self.mood = Mood::Angry;
            self.message = ANGRY_MESSAGE.to_string();
            fx.push(Effect::Cancel(TimerKind::MessageClear));
            fx.push(Effect::Cancel(TimerKind::Dizzy));
            fx.push(Effect::Cancel(TimerKind::Recover));
            fx.push(Effect::Arm(TimerKind::Angry, ANGRY_MS));
        } else if self.tap_count >= DIZZY_TAPS {
            self.mood = Mood::Dizzy;
            self.message = DIZZY_MESSAGE.to_string();
            fx.push(Effect::Cancel(TimerKind::MessageClear));
            fx.push(Effect::Arm(TimerKind::Dizzy, DIZZY_MS));
            fx.push(Effect::Arm(TimerKind::Recover, DIZZY_TOTAL_MS));
        } else if !self.mood.is_emotional() {
            self.mood = Mood::Idle;
            let line = TAP_MESSAGES[rng.pick(TAP_MESSAGES.len())];
            self.show(line, fx);
            fx.push(Effect::Arm(TimerKind::TapReset, TAP_RESET_MS));
        }

        // after the mood settles: emotional moods only cancel
        self.arm_inactivity(fx);
    }

    fn on_timer(&mut self, kind: TimerKind, rng: &mut dyn RandomSource, fx: &mut Vec<Effect>) {
        match kind {
            TimerKind::Inactivity => {
                if self.mood != Mood::Sleeping && !self.mood.is_emotional() {
                    self.mood = Mood::Sleeping;
                    self.message.clear();
                    fx.push(Effect::Cancel(TimerKind::MessageClear));
                }
            }
            TimerKind::Angry | TimerKind::Recover => {
                self.mood = Mood::Idle;
                self.tap_count = 0;
                self.message.clear();
                self.arm_inactivity(fx);
            }
            TimerKind::Dizzy => {
                if self.mood == Mood::Dizzy {
                    self.mood = Mood::DizzyRecover;
                }
            }
            TimerKind::MessageClear => self.message.clear(),
            TimerKind::TapReset => self.tap_count = 0,
            TimerKind::Look => {
                if self.mood == Mood::Idle {
                    self.look_around(rng, fx);
                }
            }
            TimerKind::Blink => {
                if self.mood.can_blink() {
                    self.blink = true;
                    fx.push(Effect::Arm(TimerKind::BlinkEnd, BLINK_MS));
                }
                let gap = rng.range_ms(BLINK_GAP_MS.0, BLINK_GAP_MS.1);
                fx.push(Effect::Arm(TimerKind::Blink, gap));
            }
            TimerKind::BlinkEnd => self.blink = false,
        }
    }

    /// Starts the look-around loop when idle is entered and recenters the
    /// face when it is left.
    fn track_idle_motion(
        &mut self,
        before: Mood,
        event: Event,
        rng: &mut dyn RandomSource,
        fx: &mut Vec<Effect>,
    ) {
        let entered_idle = self.mood == Mood::Idle && (before != Mood::Idle || event == Event::Mount);
        if entered_idle {
            self.look_around(rng, fx);
        } else if before == Mood::Idle && self.mood != Mood::Idle {
            fx.push(Effect::Cancel(TimerKind::Look));
            self.face = Vec2::ZERO;
        }
    }

    fn look_around(&mut self, rng: &mut dyn RandomSource, fx: &mut Vec<Effect>) {
        self.face = Vec2 {
            x: rng.range(-LOOK_BOX.0, LOOK_BOX.0),
            y: rng.range(-LOOK_BOX.1, LOOK_BOX.1),
        };
        let gap = rng.range_ms(LOOK_GAP_MS.0, LOOK_GAP_MS.1);
        fx.push(Effect::Arm(TimerKind::Look, gap));
    }

    fn show(&mut self, text: &str, fx: &mut Vec<Effect>) {
        self.message = text.to_string();
        fx.push(Effect::Arm(TimerKind::MessageClear, MESSAGE_MS));
    }

    fn arm_inactivity(&self, fx: &mut Vec<Effect>) {
        fx.push(Effect::Cancel(TimerKind::Inactivity));
        if !self.mood.is_emotional() {
            fx.push(Effect::Arm(TimerKind::Inactivity, INACTIVITY_MS));
        }
    }
}
