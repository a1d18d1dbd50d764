/// A closed range of ray parameters or coordinates along one axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub min: f64,
    pub max: f64,
}

impl Interval {
    /// Contains nothing (`min > max`).
    pub const EMPTY: Interval = Interval {
        min: f64::INFINITY,
        max: f64::NEG_INFINITY,
    };

    /// Contains every finite value.
    pub const UNIVERSE: Interval = Interval {
        min: f64::NEG_INFINITY,
        max: f64::INFINITY,
    };

    #[inline]
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Width of the interval; negative for an empty interval.
    #[inline]
    pub fn size(&self) -> f64 {
        self.max - self.min
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.max < self.min
    }

    /// Inclusive membership test.
    #[inline]
    pub fn contains(&self, x: f64) -> bool {
        self.min <= x && x <= self.max
    }

    /// Exclusive membership test.
    #[inline]
    pub fn surrounds(&self, x: f64) -> bool {
        self.min < x && x < self.max
    }

    #[inline]
    pub fn clamp(&self, x: f64) -> f64 {
        x.clamp(self.min, self.max)
    }

    /// Grow the interval by `delta / 2` on both ends.
    pub fn expand(&self, delta: f64) -> Interval {
        let padding = delta / 2.0;
        Interval::new(self.min - padding, self.max + padding)
    }

    /// Same interval with its upper bound pulled down to `max` if smaller.
    #[inline]
    pub fn with_max(&self, max: f64) -> Interval {
        Interval::new(self.min, self.max.min(max))
    }

    /// Smallest interval containing both inputs.
    pub fn surrounding(a: &Interval, b: &Interval) -> Interval {
        Interval::new(a.min.min(b.min), a.max.max(b.max))
    }
}

impl Default for Interval {
    fn default() -> Self {
        Self::EMPTY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_is_inclusive_and_surrounds_is_not() {
        let i = Interval::new(1.0, 3.0);
        assert!(i.contains(1.0) && i.contains(3.0));
        assert!(!i.surrounds(1.0) && !i.surrounds(3.0));
        assert!(i.surrounds(2.0));
        assert!(!i.contains(3.5));
    }

    #[test]
    fn test_expand_pads_both_sides() {
        let i = Interval::new(0.0, 10.0).expand(4.0);
        assert_eq!(i, Interval::new(-2.0, 12.0));
    }

    #[test]
    fn test_with_max_only_shrinks() {
        let i = Interval::new(0.0, 10.0);
        assert_eq!(i.with_max(4.0).max, 4.0);
        assert_eq!(i.with_max(20.0).max, 10.0);
    }

    #[test]
    fn test_empty_and_universe() {
        assert!(Interval::EMPTY.is_empty());
        assert!(!Interval::EMPTY.contains(0.0));
        assert!(Interval::UNIVERSE.contains(-1e300));
        assert_eq!(Interval::default(), Interval::EMPTY);
    }

    #[test]
    fn test_surrounding_of_disjoint_intervals() {
        let s = Interval::surrounding(&Interval::new(-3.0, -1.0), &Interval::new(2.0, 5.0));
        assert_eq!(s, Interval::new(-3.0, 5.0));
        assert_eq!(s.clamp(9.0), 5.0);
    }
}
