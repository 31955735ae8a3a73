use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DbError {
    #[error("{0}")]
    InternalError(String),

    #[error("{0}")]
    BadValue(String),

    #[error("{0}")]
    FailedToParse(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    AuthenticationFailed(String),

    #[error("{0}")]
    IllegalOperation(String),

    #[error("{0}")]
    NamespaceNotFound(String),

    #[error("Collection '{0}' already exists")]
    NamespaceExists(String),

    #[error("operation exceeded time limit")]
    MaxTimeMSExpired,

    #[error("{0}")]
    CommandNotFound(String),

    #[error("{0}")]
    InvalidOptions(String),

    #[error("{0}")]
    InvalidNamespace(String),

    #[error("{0}")]
    CommandNotSupportedOnView(String),

    #[error("{0}")]
    CollectionUuidMismatch(String),

    #[error("operation was interrupted")]
    Interrupted,

    #[error("{0}")]
    NotPrimaryOrSecondary(String),

    #[error("BSON field '{0}' is an unknown field.")]
    UnknownField(String),

    #[error("Lock error: {0}")]
    LockError(String),

    #[error("I/O error: {0}")]
    IoError(String),
}

impl DbError {
    /// Numeric error code as reported in command replies.
    pub fn code(&self) -> i32 {
        match self {
            Self::InternalError(_) | Self::LockError(_) | Self::IoError(_) => 1,
            Self::BadValue(_) => 2,
            Self::FailedToParse(_) => 9,
            Self::Unauthorized(_) => 13,
            Self::AuthenticationFailed(_) => 18,
            Self::IllegalOperation(_) => 20,
            Self::NamespaceNotFound(_) => 26,
            Self::NamespaceExists(_) => 48,
            Self::MaxTimeMSExpired => 50,
            Self::CommandNotFound(_) => 59,
            Self::InvalidOptions(_) => 72,
            Self::InvalidNamespace(_) => 73,
            Self::CommandNotSupportedOnView(_) => 166,
            Self::CollectionUuidMismatch(_) => 361,
            Self::Interrupted => 11601,
            Self::NotPrimaryOrSecondary(_) => 13436,
            Self::UnknownField(_) => 40415,
        }
    }

    /// Symbolic error code name as reported in command replies.
    pub fn code_name(&self) -> &'static str {
        match self {
            Self::InternalError(_) | Self::LockError(_) | Self::IoError(_) => "InternalError",
            Self::BadValue(_) => "BadValue",
            Self::FailedToParse(_) => "FailedToParse",
            Self::Unauthorized(_) => "Unauthorized",
            Self::AuthenticationFailed(_) => "AuthenticationFailed",
            Self::IllegalOperation(_) => "IllegalOperation",
            Self::NamespaceNotFound(_) => "NamespaceNotFound",
            Self::NamespaceExists(_) => "NamespaceExists",
            Self::MaxTimeMSExpired => "MaxTimeMSExpired",
            Self::CommandNotFound(_) => "CommandNotFound",
            Self::InvalidOptions(_) => "InvalidOptions",
            Self::InvalidNamespace(_) => "InvalidNamespace",
            Self::CommandNotSupportedOnView(_) => "CommandNotSupportedOnView",
            Self::CollectionUuidMismatch(_) => "CollectionUUIDMismatch",
            Self::Interrupted => "Interrupted",
            Self::NotPrimaryOrSecondary(_) => "NotPrimaryOrSecondary",
            Self::UnknownField(_) => "Location40415",
        }
    }
}

pub type Result<T> = std::result::Result<T, DbError>;

impl<T> From<std::sync::PoisonError<T>> for DbError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        Self::LockError(err.to_string())
    }
}

impl From<std::io::Error> for DbError {
    fn from(err: std::io::Error) -> Self {
        Self::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for DbError {
    fn from(err: serde_json::Error) -> Self {
        Self::FailedToParse(err.to_string())
    }
}
