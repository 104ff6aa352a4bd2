use std::time::Instant;

/// Milliseconds on the scheduler timeline. Zero is whenever the clock was created.
pub(crate) type Millis = u64;

pub(crate) trait Clock {
    fn now_ms(&self) -> Millis;
}

pub(crate) struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub(crate) fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> Millis {
        self.origin.elapsed().as_millis() as Millis
    }
}

#[cfg(test)]
pub(crate) struct ManualClock {
    now: std::cell::Cell<Millis>,
}

#[cfg(test)]
impl ManualClock {
    pub(crate) fn new() -> Self {
        Self {
            now: std::cell::Cell::new(0),
        }
    }

    pub(crate) fn set(&self, ms: Millis) {
        self.now.set(ms);
    }

    pub(crate) fn advance(&self, ms: Millis) {
        self.now.set(self.now.get() + ms);
    }
}

#[cfg(test)]
impl Clock for ManualClock {
    fn now_ms(&self) -> Millis {
        self.now.get()
    }
}
