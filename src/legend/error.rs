use thiserror::Error;

#[derive(Debug, Error)]
pub enum LegendError {
    #[error("Legend has no column entries ({lines} non-empty line(s) examined)")]
    Empty { lines: usize },
}
