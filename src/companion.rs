use crate::anim::{circ_out, ease_in_out, Tween, Typewriter, Vec2};
use crate::clock::Millis;
use crate::mascot::{Effect, Event, MascotState, TimerKind};
use crate::rng::RandomSource;
use crate::timers::TimerTable;
use tracing::{debug, info};

const LOOK_TWEEN_MS: Millis = 600;
const CENTER_TWEEN_MS: Millis = 500;
const MESSAGE_CHAR_MS: Millis = 30;

/// Owns the mascot state and its timers. Everything time-related goes through
/// `tap` and `advance`, both of which take the current scheduler time.
pub(crate) struct Companion<R: RandomSource> {
    state: MascotState,
    timers: TimerTable<TimerKind>,
    rng: R,
    now: Millis,
    mood_since: Millis,
    face: Tween,
    typed: Option<Typewriter>,
    alive: bool,
}

impl<R: RandomSource> Companion<R> {
    pub(crate) fn mount(rng: R, now: Millis) -> Self {
        let mut c = Self {
            state: MascotState::default(),
            timers: TimerTable::new(),
            rng,
            now,
            mood_since: now,
            face: Tween::still(Vec2::ZERO),
            typed: None,
            alive: true,
        };
        info!(at = now, "companion mounted");
        c.dispatch(Event::Mount);
        c
    }

    pub(crate) fn state(&self) -> &MascotState {
        &self.state
    }

    #[cfg(test)]
    pub(crate) fn mood(&self) -> crate::mascot::Mood {
        self.state.mood
    }

    pub(crate) fn mood_since(&self) -> Millis {
        self.mood_since
    }

    #[cfg(test)]
    pub(crate) fn timers(&self) -> &TimerTable<TimerKind> {
        &self.timers
    }

    /// Fires every timer due at or before `now`, in deadline order.
    pub(crate) fn advance(&mut self, now: Millis) {
        if !self.alive {
            return;
        }
        while let Some((kind, at)) = self.timers.pop_due(now) {
            self.now = at.max(self.now);
            self.dispatch(Event::Fired(kind));
        }
        self.now = now.max(self.now);
    }

    pub(crate) fn tap(&mut self, now: Millis) {
        if !self.alive {
            return;
        }
        self.advance(now);
        self.dispatch(Event::Tap(now));
    }

    /// Cancels every pending timer. Later taps and clock advances are ignored.
    pub(crate) fn teardown(&mut self) {
        self.timers.clear();
        self.alive = false;
        info!(at = self.now, "companion torn down");
    }

    pub(crate) fn face_at(&self, now: Millis) -> Vec2 {
        self.face.sample(now)
    }

    /// Portion of the current message revealed so far.
    pub(crate) fn typed_message(&self, now: Millis) -> &str {
        match &self.typed {
            Some(tw) if !self.state.message.is_empty() => tw.visible(now),
            _ => "",
        }
    }

    fn dispatch(&mut self, event: Event) {
        let (next, effects) = self.state.step(event, &mut self.rng);
        let prev = std::mem::replace(&mut self.state, next);

        for fx in effects {
            match fx {
                Effect::Arm(kind, delay) => self.timers.arm(kind, self.now + delay),
                Effect::Cancel(kind) => self.timers.cancel(kind),
            }
        }

        if prev.mood != self.state.mood {
            debug!(
                from = prev.mood.label(),
                to = self.state.mood.label(),
                taps = self.state.tap_count,
                at = self.now,
                "mood changed"
            );
            self.mood_since = self.now;
        }
        if prev.face != self.state.face || event == Event::Mount {
            let (dur, ease): (Millis, fn(f32) -> f32) = if self.state.face == Vec2::ZERO {
                (CENTER_TWEEN_MS, ease_in_out)
            } else {
                (LOOK_TWEEN_MS, circ_out)
            };
            self.face.retarget(self.now, self.state.face, dur, ease);
        }
        if prev.message != self.state.message && !self.state.message.is_empty() {
            self.typed = Some(Typewriter::new(
                self.state.message.clone(),
                self.now,
                MESSAGE_CHAR_MS,
            ));
        }
    }
}
