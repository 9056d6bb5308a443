use crate::config::ConfigError;
use crate::operational::format::ResponseFormat;
use crate::types::station_kind::StationKind;
use bon::Builder;

/// Parameters of one operational API request.
///
/// `station_id` and `station_name` narrow the result to one station; without either
/// the API returns every station of the kind.
///
/// ```
/// use imgw_data::{ResponseFormat, StationKind, StationQuery};
///
/// let query = StationQuery::builder()
///     .kind(StationKind::Synop)
///     .station_name("Jelenia Góra")
///     .build();
/// assert_eq!(query.format, ResponseFormat::Json);
/// assert!(query.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Builder)]
pub struct StationQuery {
    pub kind: StationKind,
    #[builder(into)]
    pub station_id: Option<String>,
    #[builder(into)]
    pub station_name: Option<String>,
    #[builder(default)]
    pub format: ResponseFormat,
}

impl StationQuery {
    /// Rejects queries naming a station both by id and by name.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match (&self.station_id, &self.station_name) {
            (Some(station_id), Some(station_name)) => {
                Err(ConfigError::ConflictingStationFilters {
                    station_id: station_id.clone(),
                    station_name: station_name.clone(),
                })
            }
            _ => Ok(()),
        }
    }

    /// Short description of the station filter, used in error context.
    pub fn filter_description(&self) -> String {
        match (&self.station_id, &self.station_name) {
            (Some(id), Some(name)) => format!("id={id}, name={name}"),
            (Some(id), None) => format!("id={id}"),
            (None, Some(name)) => format!("name={name}"),
            (None, None) => "all stations".to_string(),
        }
    }
}
