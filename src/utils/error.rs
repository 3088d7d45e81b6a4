use thiserror::Error;

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("No driver available for passenger {passenger_id}")]
    NoDriverAvailable { passenger_id: i64 },

    #[error("Data integrity error: {message}")]
    DataIntegrity { message: String },

    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV processing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValue {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl DispatchError {
    pub fn data_integrity(message: impl Into<String>) -> Self {
        Self::DataIntegrity {
            message: message.into(),
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// 查找失敗和無司機可派都可由呼叫端自行處理
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::NoDriverAvailable { .. })
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::NotFound { .. } => ErrorSeverity::Low,
            Self::NoDriverAvailable { .. } => ErrorSeverity::Medium,
            Self::InvalidArgument { .. }
            | Self::Config { .. }
            | Self::InvalidConfigValue { .. } => ErrorSeverity::High,
            Self::DataIntegrity { .. }
            | Self::Io(_)
            | Self::Csv(_)
            | Self::Serialization(_) => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::NotFound { entity, id } => format!("No {} with id {}", entity, id),
            Self::NoDriverAvailable { .. } => {
                "Every driver is currently on a trip, try again later".to_string()
            }
            Self::DataIntegrity { message } => format!("The dataset is inconsistent: {}", message),
            Self::Io(e) => format!("Could not read the dataset: {}", e),
            Self::Csv(e) => format!("Could not parse the dataset: {}", e),
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "Use the `passengers` or `drivers` command to list valid ids",
            Self::NoDriverAvailable { .. } => "Wait for a driver to finish a trip and retry",
            Self::DataIntegrity { .. } => {
                "Fix the offending row; every trip must reference a loaded passenger and driver"
            }
            Self::InvalidArgument { .. } => "Pass at least one available driver",
            Self::Io(_) | Self::Csv(_) => {
                "Check that --data-dir contains passengers.csv, drivers.csv and trips.csv"
            }
            Self::Serialization(_) => "Retry without --json",
            Self::Config { .. } | Self::InvalidConfigValue { .. } => {
                "Check the configuration file and command line flags"
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, DispatchError>;
