//! Time granularity of archival files.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Granularity of a historical data file.
///
/// Monthly files have no day column; their dates fall on the first of the month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    /// One row per station and day (`dobowe`).
    Daily,
    /// One row per station and month (`miesieczne`), possibly several for extremes.
    Monthly,
    /// Raw 10-minute measurements (`dane_10min`).
    #[serde(rename = "raw_10min")]
    Raw10Min,
}

impl Frequency {
    pub(crate) fn path_segment(&self) -> &'static str {
        match self {
            Frequency::Daily => "dobowe",
            Frequency::Monthly => "miesieczne",
            Frequency::Raw10Min => "dane_10min",
        }
    }
}

/// Formats the frequency with its archive directory name.
///
/// ```
/// use imgw_data::Frequency;
///
/// assert_eq!(Frequency::Daily.to_string(), "dobowe");
/// assert_eq!(Frequency::Raw10Min.to_string(), "dane_10min");
/// ```
impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path_segment())
    }
}
