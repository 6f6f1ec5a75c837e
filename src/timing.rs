//! Event coalescing policies.
//!
//! Both types are pure state machines over host timestamps in milliseconds;
//! the wasm glue owns the actual timers. Resize uses [`Debouncer`] (trailing
//! edge), scroll uses [`Throttle`] (leading edge).

/// Trailing-edge debounce: a burst of signals yields one value, the last one,
/// once no signal has arrived for `delay_ms`.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    delay_ms: f64,
    pending: Option<(T, f64)>,
}

impl<T> Debouncer<T> {
    pub fn new(delay_ms: f64) -> Self {
        Self { delay_ms, pending: None }
    }

    pub fn delay_ms(&self) -> f64 {
        self.delay_ms
    }

    /// Record a signal, replacing anything pending and pushing the deadline out.
    pub fn signal(&mut self, now_ms: f64, value: T) {
        self.pending = Some((value, now_ms + self.delay_ms));
    }

    /// Release the pending value if the quiet period has elapsed.
    pub fn poll(&mut self, now_ms: f64) -> Option<T> {
        match &self.pending {
            Some((_, deadline)) if now_ms >= *deadline => self.pending.take().map(|(v, _)| v),
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }
}

/// Leading-edge throttle: the first event runs immediately, then events are
/// dropped until `interval_ms` has passed.
#[derive(Debug, Clone)]
pub struct Throttle {
    interval_ms: f64,
    last_ms: Option<f64>,
}

impl Throttle {
    pub fn new(interval_ms: f64) -> Self {
        Self { interval_ms, last_ms: None }
    }

    pub fn try_acquire(&mut self, now_ms: f64) -> bool {
        match self.last_ms {
            Some(last) if now_ms - last < self.interval_ms => false,
            _ => {
                self.last_ms = Some(now_ms);
                true
            }
        }
    }
}
