//! Scripted stand-ins for the network and the clock.

use crate::config::ImgwConfig;
use crate::fetcher::error::TransportError;
use crate::fetcher::transport::{RawResponse, Sleeper, Transport};
use crate::imgw::Imgw;
use reqwest::{StatusCode, Url};
use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub url: String,
    pub params: Vec<(String, String)>,
    pub timeout: Duration,
}

#[derive(Default)]
struct FakeState {
    scripts: HashMap<String, VecDeque<Result<RawResponse, TransportError>>>,
    requests: Vec<RecordedRequest>,
}

/// Replays scripted responses per URL, in order, and records every request.
///
/// A URL without a remaining scripted response fails with a connection error.
#[derive(Clone, Default)]
pub struct FakeTransport {
    state: Arc<Mutex<FakeState>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, url: &str, response: Result<RawResponse, TransportError>) -> &Self {
        self.state
            .lock()
            .unwrap()
            .scripts
            .entry(url.to_string())
            .or_default()
            .push_back(response);
        self
    }

    pub fn respond_ok(&self, url: &str, body: impl Into<Vec<u8>>) -> &Self {
        self.push(url, Ok(RawResponse::ok(body)))
    }

    pub fn respond_status(&self, url: &str, status: StatusCode) -> &Self {
        self.push(url, Ok(RawResponse::with_status(status)))
    }

    pub fn fail(&self, url: &str, error: TransportError) -> &Self {
        self.push(url, Err(error))
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn request_count(&self) -> usize {
        self.state.lock().unwrap().requests.len()
    }
}

impl Transport for FakeTransport {
    fn get(
        &self,
        url: &Url,
        params: &[(&str, String)],
        timeout: Duration,
    ) -> impl Future<Output = Result<RawResponse, TransportError>> + Send {
        let mut state = self.state.lock().unwrap();
        state.requests.push(RecordedRequest {
            url: url.to_string(),
            params: params
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
            timeout,
        });
        let response = state
            .scripts
            .get_mut(url.as_str())
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| Err(TransportError::Connect(format!("no scripted response for {url}"))));
        std::future::ready(response)
    }
}

/// Records requested delays and returns immediately.
#[derive(Clone, Default)]
pub struct RecordingSleeper {
    delays: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingSleeper {
    pub fn delays(&self) -> Vec<Duration> {
        self.delays.lock().unwrap().clone()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send {
        self.delays.lock().unwrap().push(duration);
        std::future::ready(())
    }
}

pub fn fake_imgw(
    transport: &FakeTransport,
    sleeper: &RecordingSleeper,
) -> Imgw<FakeTransport, RecordingSleeper> {
    fake_imgw_with_config(ImgwConfig::default(), transport, sleeper)
}

pub fn fake_imgw_with_config(
    config: ImgwConfig,
    transport: &FakeTransport,
    sleeper: &RecordingSleeper,
) -> Imgw<FakeTransport, RecordingSleeper> {
    Imgw::with_parts(config, transport.clone(), sleeper.clone()).unwrap()
}

/// Builds an in-memory ZIP archive from `(name, content)` pairs.
pub fn zip_bytes(members: &[(&str, &str)]) -> Vec<u8> {
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    for (name, content) in members {
        writer.start_file(*name, SimpleFileOptions::default()).unwrap();
        writer.write_all(content.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

pub async fn gzip_bytes(data: &[u8]) -> Vec<u8> {
    use async_compression::tokio::bufread::GzipEncoder;
    use tokio::io::AsyncReadExt;

    let mut encoder = GzipEncoder::new(data);
    let mut compressed = Vec::new();
    encoder.read_to_end(&mut compressed).await.unwrap();
    compressed
}

/// Reads every sheet of an `.xlsx` buffer as `(sheet name, rows)`, header row included.
pub fn read_workbook(bytes: &[u8]) -> Vec<(String, Vec<Vec<calamine::Data>>)> {
    use calamine::{open_workbook_from_rs, Reader, Xlsx};

    let mut workbook: Xlsx<_> =
        open_workbook_from_rs(std::io::Cursor::new(bytes.to_vec())).unwrap();
    workbook
        .sheet_names()
        .into_iter()
        .map(|name| {
            let range = workbook.worksheet_range(&name).unwrap();
            let rows = range.rows().map(<[calamine::Data]>::to_vec).collect();
            (name, rows)
        })
        .collect()
}
