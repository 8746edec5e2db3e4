use crate::messages::{PlayerId, SpeedSample};
use cruise_core::error::{CruiseError, CruiseResult};

/// Operator target speed in km/h
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SetpointStore {
    kmh: i32,
}

impl SetpointStore {
    pub fn new(kmh: i32) -> Self {
        Self { kmh }
    }

    pub fn get(&self) -> i32 {
        self.kmh
    }

    pub fn set(&mut self, kmh: i32) {
        self.kmh = kmh;
    }

    /// Parse operator text and store it.
    ///
    /// Surrounding whitespace is ignored and a leading sign is allowed.
    /// Anything else is rejected and the stored value is kept.
    pub fn submit_text(&mut self, text: &str) -> CruiseResult<i32> {
        // Whole-string parse: "80 km/h" is rejected rather than read as 80
        let kmh = text
            .trim()
            .parse::<i32>()
            .map_err(|_| CruiseError::SetpointParse(text.to_string()))?;
        self.kmh = kmh;
        Ok(kmh)
    }
}

/// Latest observed speed of the tracked target, internal units
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryCache {
    target: PlayerId,
    scale: f64,
    speed: f64,
    fresh: bool,
}

impl TelemetryCache {
    /// `scale` converts transport units to internal units
    pub fn new(target: PlayerId, scale: f64) -> Self {
        Self {
            target,
            scale,
            speed: 0.0,
            fresh: false,
        }
    }

    pub fn target(&self) -> PlayerId {
        self.target
    }

    pub fn get(&self) -> f64 {
        self.speed
    }

    pub fn set(&mut self, speed: f64) {
        self.speed = speed;
        self.fresh = true;
    }

    /// False until the first sample of the current session
    pub fn has_sample(&self) -> bool {
        self.fresh
    }

    /// Store a sample if it belongs to the tracked target
    pub fn ingest(&mut self, sample: &SpeedSample) -> CruiseResult<f64> {
        if sample.target != self.target {
            return Err(CruiseError::UnknownTarget(sample.target.0));
        }
        self.set(sample.speed * self.scale);
        Ok(self.speed)
    }

    /// Back to 0, stale
    pub fn reset(&mut self) {
        self.speed = 0.0;
        self.fresh = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setpoint_accepts_integers() {
        let mut store = SetpointStore::default();
        assert_eq!(store.submit_text("80").unwrap(), 80);
        assert_eq!(store.submit_text("  120 ").unwrap(), 120);
        assert_eq!(store.submit_text("+30").unwrap(), 30);
        assert_eq!(store.submit_text("-10").unwrap(), -10);
        assert_eq!(store.get(), -10);
    }

    #[test]
    fn test_setpoint_rejects_garbage() {
        let mut store = SetpointStore::new(55);
        for text in ["abc", "", "   ", "12abc", "80 km/h", "1.5", "0x10", "99999999999"] {
            let result = store.submit_text(text);
            assert!(matches!(result, Err(CruiseError::SetpointParse(_))), "{:?}", text);
            assert_eq!(store.get(), 55);
        }
    }

    #[test]
    fn test_telemetry_tracks_one_target() {
        let mut cache = TelemetryCache::new(PlayerId(2), 1.0);
        assert!(!cache.has_sample());

        let other = cache.ingest(&SpeedSample::new(PlayerId(3), 5000.0));
        assert!(matches!(other, Err(CruiseError::UnknownTarget(3))));
        assert_eq!(cache.get(), 0.0);

        assert_eq!(cache.ingest(&SpeedSample::new(PlayerId(2), 2730.0)).unwrap(), 2730.0);
        assert!(cache.has_sample());

        cache.reset();
        assert_eq!(cache.get(), 0.0);
        assert!(!cache.has_sample());
    }

    #[test]
    fn test_telemetry_scale() {
        let mut cache = TelemetryCache::new(PlayerId(1), 0.5);
        assert_eq!(cache.ingest(&SpeedSample::new(PlayerId(1), 100.0)).unwrap(), 50.0);
    }
}
