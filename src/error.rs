use thiserror::Error;

/// Fatal conditions that abort a generation run. Degraded form lookups are
/// not represented here; they are absorbed in `form` and only logged.
#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("event data unavailable: {0}")]
    DataSourceUnavailable(String),

    #[error("found only {found} matches, {required} required")]
    InsufficientMatches { found: usize, required: usize },
}

impl GenerateError {
    pub fn data_source(err: anyhow::Error) -> Self {
        // `{:#}` keeps the context chain on one line.
        GenerateError::DataSourceUnavailable(format!("{err:#}"))
    }
}
