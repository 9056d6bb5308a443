pub mod archive_client;
pub mod export_client;
pub mod station_client;
