//! Opening historical data files: container detection, member selection and raw table
//! reading.

pub mod container;
pub mod error;
pub mod listing;
pub mod reader;

use crate::archive::container::{
    file_name_from_url, gunzip, read_zip_member, select_member, zip_members, ContainerKind,
};
use crate::archive::error::ArchiveError;
use crate::legend::LegendMap;
use log::{debug, info};
use tokio::task;

/// The data file selected from an archive, together with its parsed legend.
#[derive(Debug, Clone)]
pub struct ArchivePayload {
    pub data: Vec<u8>,
    pub member_name: String,
    pub legend: LegendMap,
}

/// Extracts the data file from downloaded bytes.
///
/// Returns the member name and its content. `requested` names the member to read from a
/// ZIP archive holding several data files; it is ignored for GZIP and plain files.
pub(crate) async fn unpack(
    url: &str,
    bytes: Vec<u8>,
    requested: Option<&str>,
) -> Result<(String, Vec<u8>), ArchiveError> {
    match ContainerKind::detect(&bytes) {
        ContainerKind::Zip => {
            let url_owned = url.to_string();
            let requested = requested.map(str::to_string);
            let (member, data) = task::spawn_blocking(move || {
                let members = zip_members(&url_owned, &bytes)?;
                debug!("{} holds {} member(s): {:?}", url_owned, members.len(), members);
                let member = select_member(&url_owned, &members, requested.as_deref())?;
                let data = read_zip_member(&url_owned, &bytes, &member)?;
                Ok::<_, ArchiveError>((member, data))
            })
            .await??;
            info!("Selected member '{}' of {}", member, url);
            Ok((member, data))
        }
        ContainerKind::Gzip => {
            let name = file_name_from_url(url);
            let member = name.strip_suffix(".gz").unwrap_or(&name).to_string();
            let data = gunzip(url, &bytes).await?;
            Ok((member, data))
        }
        ContainerKind::Plain => Ok((file_name_from_url(url), bytes)),
    }
}

/// Lists the members of a ZIP archive. Other containers hold exactly one file, named after
/// the URL.
pub(crate) async fn members(url: &str, bytes: Vec<u8>) -> Result<Vec<String>, ArchiveError> {
    match ContainerKind::detect(&bytes) {
        ContainerKind::Zip => {
            let url_owned = url.to_string();
            Ok(task::spawn_blocking(move || zip_members(&url_owned, &bytes)).await??)
        }
        ContainerKind::Gzip => {
            let name = file_name_from_url(url);
            Ok(vec![name.strip_suffix(".gz").unwrap_or(&name).to_string()])
        }
        ContainerKind::Plain => Ok(vec![file_name_from_url(url)]),
    }
}
