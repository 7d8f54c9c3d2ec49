use thiserror::Error;

/// Failures surfaced by the API client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport failure: unreachable host, timeout, connection reset.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("backend returned {status}: {message}")]
    Status { status: u16, message: String },

    /// The response body did not have the expected shape.
    #[error("unexpected response: {0}")]
    Decode(String),

    /// The backend exposes no endpoint for this operation.
    #[error("{0} is not available")]
    NotImplemented(&'static str),

    /// The owning screen went away before the request finished.
    #[error("request cancelled")]
    Cancelled,

    #[error("invalid base url {0:?}")]
    InvalidBaseUrl(String),
}

impl ApiError {
    /// Static text a screen shows next to its "Try again" action.
    pub fn user_message(&self) -> &'static str {
        match self {
            ApiError::Network(_) => "Unable to reach the server. Please check your connection and try again.",
            ApiError::Status { status, .. } if *status == 404 => "We couldn't find what you were looking for.",
            ApiError::Status { .. } => "The server could not complete your request. Please try again.",
            ApiError::Decode(_) => "Received an unexpected response. Please try again.",
            ApiError::NotImplemented(_) => "This action is not available yet.",
            ApiError::Cancelled => "Request cancelled.",
            ApiError::InvalidBaseUrl(_) => "The API address is misconfigured.",
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::Status { status: 404, .. })
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Client-side form validation failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("{0} is required")]
    Required(&'static str),

    #[error("passengers must be between {min} and {max}")]
    PassengerCount { min: u32, max: u32 },

    #[error("passenger {index}: name is required")]
    PassengerName { index: usize },

    #[error("a valid email is required")]
    InvalidEmail,
}

/// Booking flow failures: bad transitions, invalid input, or the API call itself.
#[derive(Debug, Error)]
pub enum FlowError {
    #[error("cannot {action} while {state}")]
    InvalidState { state: &'static str, action: &'static str },

    #[error("booking form has {} error(s)", .0.len())]
    Invalid(Vec<FormError>),

    #[error("booking {booking_id} is awaiting payment")]
    PendingPayment { booking_id: String },

    #[error("flight is sold out")]
    SoldOut,

    #[error(transparent)]
    Api(#[from] ApiError),
}
