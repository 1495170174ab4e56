use thiserror::Error;

/// Everything that can go wrong between an upload and the derived views.
///
/// All variants are recoverable at the interaction boundary: the session
/// reports them and keeps running.
#[derive(Debug, Error)]
pub enum DashError {
    /// The upload could not be read (unsupported format, corrupt content,
    /// duplicate headers).
    #[error("could not load data: {0}")]
    Parse(String),

    /// The range bounds are out of order or do not fit the column kind.
    #[error("invalid range: {0}")]
    InvalidRange(String),

    /// No numeric column is available for the KPI / correlation widgets.
    #[error("no numeric columns available")]
    EmptySelection,

    /// A statistic has no defined value for the current rows.
    #[error("{name} is undefined: {reason}")]
    UndefinedStatistic { name: String, reason: String },

    #[error("unknown column: {0}")]
    UnknownColumn(String),
}

impl DashError {
    /// Wrap an `anyhow` chain from a reader into a [`DashError::Parse`].
    pub fn parse(err: anyhow::Error) -> Self {
        DashError::Parse(format!("{err:#}"))
    }
}
