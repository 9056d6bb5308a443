//! Defines the three kinds of operational station data served by the IMGW API.

use crate::operational::schema::{FieldSpec, HYDRO_SCHEMA, METEO_SCHEMA, SYNOP_SCHEMA};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The operational dataset to query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StationKind {
    /// Hydrological stations (water gauges): water level, flow, water temperature, ice.
    Hydro,
    /// Synoptic stations: air temperature, wind, humidity, precipitation, pressure.
    Synop,
    /// Automatic meteorological stations reporting 10-minute values.
    Meteo,
}

/// Which station filters the API evaluates on its side for a given kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerFilters {
    pub by_id: bool,
    pub by_name: bool,
}

impl StationKind {
    pub const ALL: [StationKind; 3] = [StationKind::Hydro, StationKind::Synop, StationKind::Meteo];

    pub(crate) fn path_segment(&self) -> &'static str {
        match self {
            StationKind::Hydro => "hydro",
            StationKind::Synop => "synop",
            StationKind::Meteo => "meteo",
        }
    }

    /// The fixed field schema the API publishes for this kind, in column order.
    pub fn schema(&self) -> &'static [FieldSpec] {
        match self {
            StationKind::Hydro => HYDRO_SCHEMA,
            StationKind::Synop => SYNOP_SCHEMA,
            StationKind::Meteo => METEO_SCHEMA,
        }
    }

    /// Column holding the station identifier.
    pub fn id_field(&self) -> &'static str {
        match self {
            StationKind::Hydro | StationKind::Synop => "id_stacji",
            StationKind::Meteo => "kod_stacji",
        }
    }

    /// Column holding the human-readable station name.
    pub fn station_field(&self) -> &'static str {
        match self {
            StationKind::Hydro | StationKind::Synop => "stacja",
            StationKind::Meteo => "nazwa_stacji",
        }
    }

    pub fn server_filters(&self) -> ServerFilters {
        match self {
            StationKind::Synop => ServerFilters {
                by_id: true,
                by_name: true,
            },
            StationKind::Hydro => ServerFilters {
                by_id: true,
                by_name: false,
            },
            StationKind::Meteo => ServerFilters {
                by_id: false,
                by_name: false,
            },
        }
    }
}

impl fmt::Display for StationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path_segment())
    }
}
