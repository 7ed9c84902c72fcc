use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;

// Every Maps web service response carries a status and, on failure, an error message.
#[derive(Deserialize, Debug)]
pub struct ApiStatus {
    pub status: String,
    #[serde(default)]
    pub error_message: Option<String>,
}

#[derive(Error, Debug)]
pub enum RoutingError {
    // The service understood the request but refused it (quota, key, bad parameters)
    #[error("API Error ({status}): {message}")]
    ApiError { status: String, message: String },

    // A fallback for non-success HTTP responses with no usable JSON body
    #[error("Unstructured API Error: {0}")]
    RawApiError(String),

    #[error("Underlying request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Failed to parse JSON response: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("No {mode} itinerary between {origin} and {destination}")]
    NoItinerary {
        mode: String,
        origin: String,
        destination: String,
    },

    #[error("Generic error: {0}")]
    Generic(String),
}

impl RoutingError {
    pub fn from_status(status: ApiStatus) -> Self {
        RoutingError::ApiError {
            message: status
                .error_message
                .unwrap_or_else(|| "no error message".to_string()),
            status: status.status,
        }
    }
}

/// Failures reading or writing the on-disk caches. These are fatal for a run.
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Cache I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cache file {path} is not valid JSON: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
