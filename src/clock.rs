/// Elapsed-time source for periodic motion.
///
/// Fed with host timestamps in milliseconds (e.g. `performance.now()` or the
/// value handed to an animation frame callback), reports seconds since the
/// first sample. Never runs backwards even if the host timestamps do.
#[derive(Debug, Default, Clone)]
pub struct FrameClock {
    origin_ms: Option<f64>,
    last_secs: f64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sample(&mut self, now_ms: f64) -> f64 {
        let origin = *self.origin_ms.get_or_insert(now_ms);
        let secs = ((now_ms - origin) / 1000.0).max(self.last_secs);
        self.last_secs = secs;
        secs
    }

    pub fn elapsed(&self) -> f64 {
        self.last_secs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_zero_and_is_monotonic() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.sample(5_000.0), 0.0);
        assert_eq!(clock.sample(6_500.0), 1.5);
        assert_eq!(clock.sample(6_000.0), 1.5);
        assert_eq!(clock.sample(7_000.0), 2.0);
        assert_eq!(clock.elapsed(), 2.0);
    }
}
