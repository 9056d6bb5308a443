//! Detecting and opening the containers the archive tree publishes data in.

use crate::archive::error::ArchiveError;
use async_compression::tokio::bufread::GzipDecoder;
use log::debug;
use std::io::{Cursor, Read};
use tokio::io::AsyncReadExt;
use zip::ZipArchive;

const ZIP_MAGIC: [&[u8]; 2] = [b"PK\x03\x04", b"PK\x05\x06"];
const GZIP_MAGIC: &[u8] = &[0x1f, 0x8b];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    Zip,
    Gzip,
    Plain,
}

impl ContainerKind {
    /// Identifies the container from its leading bytes.
    pub fn detect(bytes: &[u8]) -> Self {
        if ZIP_MAGIC.iter().any(|magic| bytes.starts_with(magic)) {
            ContainerKind::Zip
        } else if bytes.starts_with(GZIP_MAGIC) {
            ContainerKind::Gzip
        } else {
            ContainerKind::Plain
        }
    }
}

/// Last path segment of a URL, without query or fragment.
pub(crate) fn file_name_from_url(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(path)
        .to_string()
}

fn open_zip<'a>(url: &str, bytes: &'a [u8]) -> Result<ZipArchive<Cursor<&'a [u8]>>, ArchiveError> {
    ZipArchive::new(Cursor::new(bytes)).map_err(|source| ArchiveError::CorruptZip {
        url: url.to_string(),
        source,
    })
}

/// Names of the file members of a ZIP archive, in archive order.
pub(crate) fn zip_members(url: &str, bytes: &[u8]) -> Result<Vec<String>, ArchiveError> {
    let mut archive = open_zip(url, bytes)?;
    let mut members = Vec::with_capacity(archive.len());
    for index in 0..archive.len() {
        let entry = archive
            .by_index(index)
            .map_err(|source| ArchiveError::CorruptZip {
                url: url.to_string(),
                source,
            })?;
        if !entry.is_dir() {
            members.push(entry.name().to_string());
        }
    }
    Ok(members)
}

/// Members that hold tabular data.
pub(crate) fn data_candidates(members: &[String]) -> Vec<String> {
    members
        .iter()
        .filter(|name| name.to_ascii_lowercase().ends_with(".csv"))
        .cloned()
        .collect()
}

/// Picks the member to read.
///
/// A requested member must exist. Without a request the single data candidate is taken;
/// several candidates are ambiguous and none at all is a format error.
pub(crate) fn select_member(
    url: &str,
    members: &[String],
    requested: Option<&str>,
) -> Result<String, ArchiveError> {
    if let Some(requested) = requested {
        return members
            .iter()
            .find(|name| name.as_str() == requested || file_name_from_url(name) == requested)
            .cloned()
            .ok_or_else(|| ArchiveError::NoMatchingMember {
                url: url.to_string(),
                requested: requested.to_string(),
                members: members.to_vec(),
            });
    }

    let mut candidates = data_candidates(members);
    match candidates.len() {
        0 => Err(ArchiveError::Format {
            url: url.to_string(),
            message: format!("no .csv member among {members:?}"),
        }),
        1 => Ok(candidates.remove(0)),
        _ => Err(ArchiveError::AmbiguousSelection {
            url: url.to_string(),
            candidates,
        }),
    }
}

pub(crate) fn read_zip_member(
    url: &str,
    bytes: &[u8],
    member: &str,
) -> Result<Vec<u8>, ArchiveError> {
    let mut archive = open_zip(url, bytes)?;
    let mut entry = archive
        .by_name(member)
        .map_err(|source| ArchiveError::CorruptZip {
            url: url.to_string(),
            source,
        })?;
    let mut data = Vec::with_capacity(usize::try_from(entry.size()).unwrap_or(0));
    entry
        .read_to_end(&mut data)
        .map_err(|source| ArchiveError::Decompress {
            url: url.to_string(),
            source,
        })?;
    debug!("Extracted {} bytes of '{}' from {}", data.len(), member, url);
    Ok(data)
}

pub(crate) async fn gunzip(url: &str, bytes: &[u8]) -> Result<Vec<u8>, ArchiveError> {
    let mut decoder = GzipDecoder::new(bytes);
    let mut data = Vec::new();
    decoder
        .read_to_end(&mut data)
        .await
        .map_err(|source| ArchiveError::Decompress {
            url: url.to_string(),
            source,
        })?;
    debug!("Decompressed {} -> {} bytes from {}", bytes.len(), data.len(), url);
    Ok(data)
}
