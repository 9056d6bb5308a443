use crate::archive::error::ArchiveError;
use crate::config::ConfigError;
use crate::export::error::ExportError;
use crate::fetcher::error::FetchError;
use crate::legend::error::LegendError;
use crate::normalize::error::NormalizeError;
use crate::operational::error::OperationalError;
use crate::types::frequency::Frequency;
use crate::types::station_kind::StationKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImgwError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Operational(#[from] OperationalError),

    #[error(transparent)]
    Archive(#[from] ArchiveError),

    #[error(transparent)]
    Legend(#[from] LegendError),

    #[error(transparent)]
    Normalize(#[from] NormalizeError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to load {kind} data ({filter})")]
    StationQuery {
        kind: StationKind,
        filter: String,
        #[source]
        source: Box<ImgwError>,
    },

    #[error("Failed to load {frequency} archive {data_url} (station: {})", .station_filter.as_deref().unwrap_or("all"))]
    ArchiveRequest {
        data_url: String,
        frequency: Frequency,
        station_filter: Option<String>,
        #[source]
        source: Box<ImgwError>,
    },
}

/// Coarse classification of an [`ImgwError`], for callers that only need to decide what
/// to tell the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The server could not be reached, or kept failing, within the retry budget.
    Network,
    /// The server rejected the request (4xx).
    Client,
    /// A payload could not be read: malformed response, corrupt archive, unreadable table.
    Format,
    /// An archive holds several data files and none was named.
    AmbiguousSelection,
    /// The legend file describes no columns.
    LegendEmpty,
    /// The request or configuration cannot be satisfied as given.
    Configuration,
}

impl ImgwError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ImgwError::Fetch(err) => match err {
                FetchError::InvalidUrl { .. } => ErrorKind::Configuration,
                FetchError::Network { .. } => ErrorKind::Network,
                FetchError::Client { .. } => ErrorKind::Client,
            },
            ImgwError::Operational(err) => match err {
                OperationalError::MixedKinds { .. } => ErrorKind::Configuration,
                _ => ErrorKind::Format,
            },
            ImgwError::Archive(err) => match err {
                ArchiveError::AmbiguousSelection { .. } => ErrorKind::AmbiguousSelection,
                ArchiveError::InvalidHref { .. } => ErrorKind::Configuration,
                _ => ErrorKind::Format,
            },
            ImgwError::Legend(LegendError::Empty { .. }) => ErrorKind::LegendEmpty,
            ImgwError::Normalize(err) => match err {
                NormalizeError::MissingStationColumn { .. }
                | NormalizeError::MissingDateColumn { .. } => ErrorKind::Configuration,
                NormalizeError::DataFrameProcessing(_) => ErrorKind::Format,
            },
            ImgwError::Export(err) => match err {
                ExportError::Config(_) => ErrorKind::Configuration,
                _ => ErrorKind::Format,
            },
            ImgwError::Config(_) => ErrorKind::Configuration,
            ImgwError::StationQuery { source, .. } | ImgwError::ArchiveRequest { source, .. } => {
                source.kind()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::error::{TransientFailure, TransportError};
    use std::error::Error as _;

    #[test]
    fn test_kind_of_fetch_errors() {
        let network = ImgwError::from(FetchError::Network {
            url: "https://danepubliczne.imgw.pl/api/data/synop".into(),
            attempts: 3,
            source: TransientFailure::Transport(TransportError::Timeout("60s".into())),
        });
        assert_eq!(network.kind(), ErrorKind::Network);

        let client = ImgwError::from(FetchError::Client {
            url: "https://danepubliczne.imgw.pl/x".into(),
            status: reqwest::StatusCode::NOT_FOUND,
        });
        assert_eq!(client.kind(), ErrorKind::Client);
    }

    #[test]
    fn test_kind_looks_through_context() {
        let err = ImgwError::ArchiveRequest {
            data_url: "https://danepubliczne.imgw.pl/data/x.zip".into(),
            frequency: Frequency::Daily,
            station_filter: Some("Warszawa".into()),
            source: Box::new(ImgwError::from(ArchiveError::AmbiguousSelection {
                url: "https://danepubliczne.imgw.pl/data/x.zip".into(),
                candidates: vec!["a.csv".into(), "b.csv".into()],
            })),
        };
        assert_eq!(err.kind(), ErrorKind::AmbiguousSelection);
        assert!(err.to_string().contains("dobowe"));
        assert!(err.to_string().contains("Warszawa"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_kind_of_configuration_errors() {
        let legend = ImgwError::from(LegendError::Empty { lines: 4 });
        assert_eq!(legend.kind(), ErrorKind::LegendEmpty);

        let rows = ImgwError::from(ExportError::Config(ConfigError::RowLimitOutOfRange {
            value: 1,
            min: 50_000,
            max: 500_000,
        }));
        assert_eq!(rows.kind(), ErrorKind::Configuration);

        let station = ImgwError::from(NormalizeError::MissingStationColumn {
            filter: "Kraków".into(),
            columns: vec![],
        });
        assert_eq!(station.kind(), ErrorKind::Configuration);
    }
}
