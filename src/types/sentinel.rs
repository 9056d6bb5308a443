//! Special values that IMGW files use in place of real measurements.
//!
//! These are data, not missing values: the normalizer and the exporter must carry them
//! through unchanged so that downstream users can recognise them.

/// Water level reported when the gauge did not measure (cm).
pub const WATER_LEVEL_SENTINEL: i64 = 9999;

/// Flow reported when no discharge was computed (m³/s).
pub const FLOW_SENTINEL: f64 = 99999.999;

/// Water temperature reported when no measurement was taken (°C).
pub const WATER_TEMPERATURE_SENTINEL: f64 = 99.9;

/// Marks which statistic a row of a hydrological monthly file holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtremeIndicator {
    Minimum = 1,
    Mean = 2,
    Maximum = 3,
}

impl ExtremeIndicator {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(ExtremeIndicator::Minimum),
            2 => Some(ExtremeIndicator::Mean),
            3 => Some(ExtremeIndicator::Maximum),
            _ => None,
        }
    }

    pub fn code(&self) -> i64 {
        *self as i64
    }
}

/// Whether `value` equals one of the measurement sentinels.
pub fn is_sentinel(value: f64) -> bool {
    value == WATER_LEVEL_SENTINEL as f64
        || (value - FLOW_SENTINEL).abs() < 1e-9
        || (value - WATER_TEMPERATURE_SENTINEL).abs() < 1e-9
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extreme_indicator_codes() {
        for indicator in [
            ExtremeIndicator::Minimum,
            ExtremeIndicator::Mean,
            ExtremeIndicator::Maximum,
        ] {
            assert_eq!(ExtremeIndicator::from_code(indicator.code()), Some(indicator));
        }
        assert_eq!(ExtremeIndicator::from_code(0), None);
        assert_eq!(ExtremeIndicator::from_code(4), None);
    }

    #[test]
    fn test_is_sentinel() {
        assert!(is_sentinel(9999.0));
        assert!(is_sentinel(99999.999));
        assert!(is_sentinel(99.9));
        assert!(!is_sentinel(245.0));
    }
}
