pub mod archive_request;
pub mod date_range;
pub mod frequency;
pub mod observation_table;
pub mod sentinel;
pub mod station_kind;
pub mod station_query;
