use std::ops::RangeInclusive;

/// Inclusive port range `[min, max]`.
///
/// A range with `min > max` is empty rather than an error; iterating it
/// yields nothing and `len()` is zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortRange {
    pub min: u16,
    pub max: u16,
}

impl PortRange {
    pub const FULL: PortRange = PortRange { min: 1, max: 65535 };

    pub fn new(min: u16, max: u16) -> Self {
        Self { min, max }
    }

    /// Number of ports in the range.
    pub fn len(&self) -> u64 {
        if self.min > self.max {
            0
        } else {
            u64::from(self.max - self.min) + 1
        }
    }

    pub fn is_empty(&self) -> bool {
        self.min > self.max
    }

    pub fn contains(&self, port: u16) -> bool {
        (self.min..=self.max).contains(&port)
    }

    /// Lazy ascending feed of every port in the range.
    pub fn iter(&self) -> RangeInclusive<u16> {
        self.min..=self.max
    }
}

impl Default for PortRange {
    fn default() -> Self {
        Self::FULL
    }
}

impl IntoIterator for PortRange {
    type Item = u16;
    type IntoIter = RangeInclusive<u16>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
