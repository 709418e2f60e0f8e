/// Reasons a scan request is rejected before the store is touched.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("patient id and location are required")]
    MissingScanFields,
    #[error("location not recognised: {0:?}")]
    UnknownLocation(String),
    #[error("timestamp could not be parsed: {0:?}")]
    InvalidTimestamp(String),
}

impl ValidationError {
    /// Machine-readable code surfaced to API clients.
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::MissingScanFields => "Invalid QR code",
            ValidationError::UnknownLocation(_) => "Invalid location",
            ValidationError::InvalidTimestamp(_) => "Invalid timestamp",
        }
    }

    /// Human-readable message surfaced to API clients.
    pub fn message(&self) -> &'static str {
        match self {
            ValidationError::MissingScanFields => "Patient ID and location are required",
            ValidationError::UnknownLocation(_) => "Location not recognized",
            ValidationError::InvalidTimestamp(_) => {
                "Timestamp must be an ISO 8601 date-time, e.g. 2024-01-15T09:30:00+01:00"
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),
    #[error("storage unavailable: {0}")]
    StorageUnavailable(Box<dyn std::error::Error + Send + Sync>),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl TrackerError {
    /// Wrap any backend failure as `StorageUnavailable`.
    pub fn storage(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        TrackerError::StorageUnavailable(err.into())
    }

    pub fn is_storage_unavailable(&self) -> bool {
        matches!(self, TrackerError::StorageUnavailable(_))
    }
}

impl From<sqlx::Error> for TrackerError {
    fn from(err: sqlx::Error) -> Self {
        TrackerError::storage(err)
    }
}

pub type TrackerResult<T> = std::result::Result<T, TrackerError>;
