use crate::boot::BootSequence;
use crate::clock::{Clock, Millis};
use crate::companion::Companion;
use crate::rng::RandomSource;
use crate::starfield::Starfield;

#[derive(Clone, Copy, Debug)]
pub(crate) struct StageOptions {
    pub(crate) skip_boot: bool,
    pub(crate) star_count: usize,
}

/// Host for everything on screen. The boot sequence runs first; once it hands
/// off, the companion is mounted and the ambient layers start fading in.
pub(crate) struct Stage<C: Clock, R: RandomSource> {
    clock: C,
    boot: BootSequence,
    booted_at: Option<Millis>,
    starfield: Starfield,
    companion: Option<Companion<R>>,
    rng: Option<R>,
}

impl<C: Clock, R: RandomSource> Stage<C, R> {
    pub(crate) fn new(clock: C, mut rng: R, opts: StageOptions) -> Self {
        let now = clock.now_ms();
        let starfield = Starfield::generate(opts.star_count, &mut rng);
        let mut stage = Self {
            clock,
            boot: BootSequence::start(now),
            booted_at: None,
            starfield,
            companion: None,
            rng: Some(rng),
        };
        if opts.skip_boot {
            stage.hand_off(now);
        }
        stage
    }

    /// Reads the clock, finishes the boot if due, and runs companion timers.
    /// Returns the time everything was advanced to.
    pub(crate) fn tick(&mut self) -> Millis {
        let now = self.clock.now_ms();
        if self.booted_at.is_none() && self.boot.poll(now) {
            self.hand_off(now);
        }
        if let Some(c) = self.companion.as_mut() {
            c.advance(now);
        }
        now
    }

    /// Taps before the handoff land on the boot overlay and do nothing.
    pub(crate) fn tap(&mut self) {
        let now = self.clock.now_ms();
        if let Some(c) = self.companion.as_mut() {
            c.tap(now);
        }
    }

    pub(crate) fn shutdown(&mut self) {
        if let Some(c) = self.companion.as_mut() {
            c.teardown();
        }
    }

    pub(crate) fn boot(&self) -> &BootSequence {
        &self.boot
    }

    pub(crate) fn companion(&self) -> Option<&Companion<R>> {
        self.companion.as_ref()
    }

    pub(crate) fn starfield(&self) -> &Starfield {
        &self.starfield
    }

    pub(crate) fn since_boot(&self, now: Millis) -> Option<Millis> {
        self.booted_at.map(|at| now.saturating_sub(at))
    }

    fn hand_off(&mut self, now: Millis) {
        self.booted_at = Some(now);
        if let Some(rng) = self.rng.take() {
            self.companion = Some(Companion::mount(rng, now));
        }
    }
}
