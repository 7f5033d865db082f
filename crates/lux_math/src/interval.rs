/// A closed range of ray parameters `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub min: f32,
    pub max: f32,
}

impl Interval {
    /// Create a new interval given min and max values.
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Returns true if x is strictly within the interval (min, max) (exclusive).
    pub fn surrounds(&self, x: f32) -> bool {
        self.min < x && x < self.max
    }

    /// Same interval with the upper bound moved to `max`.
    pub fn with_max(&self, max: f32) -> Interval {
        Interval::new(self.min, max)
    }

    /// Every positive ray parameter.
    pub const FORWARD: Interval = Interval {
        min: 0.0,
        max: f32::INFINITY,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_surrounds_is_exclusive() {
        let interval = Interval::new(0.0, 10.0);
        assert!(!interval.surrounds(0.0));
        assert!(!interval.surrounds(10.0));
        assert!(interval.surrounds(5.0));
    }

    #[test]
    fn test_forward_rejects_behind_origin() {
        assert!(!Interval::FORWARD.surrounds(0.0));
        assert!(!Interval::FORWARD.surrounds(-1.0));
        assert!(Interval::FORWARD.surrounds(1e10));
    }

    #[test]
    fn test_with_max_keeps_min() {
        assert_eq!(Interval::FORWARD.with_max(2.0), Interval::new(0.0, 2.0));
    }
}
