//! Daily price/volume point.

use chrono::NaiveDate;

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PricePoint {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl PricePoint {
    /// A point whose four prices all equal `close`.
    pub fn flat(date: NaiveDate, close: f64, volume: u64) -> Self {
        PricePoint {
            date,
            open: close,
            high: close,
            low: close,
            close,
            volume,
        }
    }

    /// Returns the reason this point is malformed, if it is.
    pub(crate) fn defect(&self) -> Option<String> {
        let fields = [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value <= 0.0 {
                return Some(format!("{name} must be positive, got {value}"));
            }
        }
        if self.high < self.low {
            return Some(format!("high {} below low {}", self.high, self.low));
        }
        for (name, value) in [("open", self.open), ("close", self.close)] {
            if value < self.low || value > self.high {
                return Some(format!(
                    "{name} {value} outside range [{}, {}]",
                    self.low, self.high
                ));
            }
        }
        None
    }
}
