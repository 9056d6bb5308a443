use crate::types::date_range::DateRange;
use crate::types::frequency::Frequency;
use bon::Builder;

/// Locates one historical data file and its legend, and says how to narrow the result.
#[derive(Debug, Clone, PartialEq, Eq, Builder)]
pub struct ArchiveRequest {
    /// URL of the data file: a ZIP or GZIP archive, or a plain CSV.
    #[builder(into)]
    pub data_url: String,
    /// URL of the legend (`*_info.txt`) describing the data columns.
    #[builder(into)]
    pub info_url: String,
    pub frequency: Frequency,
    /// Substring of the station name, compared without diacritics or case.
    #[builder(into)]
    pub station_filter: Option<String>,
    pub date_range: Option<DateRange>,
    /// Archive member to read when the container holds several data files.
    #[builder(into)]
    pub member: Option<String>,
}
