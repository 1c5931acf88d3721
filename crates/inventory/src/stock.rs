use serde::{Deserialize, Serialize};

/// Health of a part's stock level relative to its minimum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockStatus {
    Healthy,
    /// At or below the minimum.
    Low,
    /// At or below half the minimum.
    Critical,
}

impl StockStatus {
    pub fn classify(current: u64, minimum: u64) -> Self {
        // current <= minimum / 2, kept in integers.
        if current.saturating_mul(2) <= minimum {
            StockStatus::Critical
        } else if current <= minimum {
            StockStatus::Low
        } else {
            StockStatus::Healthy
        }
    }

    pub fn needs_reorder(self) -> bool {
        self != StockStatus::Healthy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds_are_inclusive() {
        assert_eq!(StockStatus::classify(25, 50), StockStatus::Critical);
        assert_eq!(StockStatus::classify(26, 50), StockStatus::Low);
        assert_eq!(StockStatus::classify(50, 50), StockStatus::Low);
        assert_eq!(StockStatus::classify(51, 50), StockStatus::Healthy);
    }

    #[test]
    fn odd_minimum_uses_exact_half() {
        // 7 * 0.5 = 3.5: 3 is critical, 4 is only low.
        assert_eq!(StockStatus::classify(3, 7), StockStatus::Critical);
        assert_eq!(StockStatus::classify(4, 7), StockStatus::Low);
    }

    #[test]
    fn zero_minimum_and_zero_stock_is_critical() {
        assert_eq!(StockStatus::classify(0, 0), StockStatus::Critical);
        assert_eq!(StockStatus::classify(1, 0), StockStatus::Healthy);
    }
}
