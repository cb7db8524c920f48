use thiserror::Error;

/// Failure kinds surfaced by every client call in this crate.
#[derive(Error, Debug)]
pub enum LabError {
    /// Non-2xx status, network fault or timeout.
    #[error("Remote error: {message}")]
    Remote { message: String },

    /// The geocoder returned no match for the query.
    #[error("Not found: {query}")]
    NotFound { query: String },

    /// Malformed JSON/CSV or a missing column while shaping.
    #[error("Parse error: {message}")]
    Parse { message: String },

    /// Rejected before any request was made.
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl LabError {
    pub fn remote<S: Into<String>>(message: S) -> Self {
        Self::Remote { message: message.into() }
    }

    pub fn not_found<S: Into<String>>(query: S) -> Self {
        Self::NotFound { query: query.into() }
    }

    pub fn parse<S: Into<String>>(message: S) -> Self {
        Self::Parse { message: message.into() }
    }

    pub fn invalid_input<S: Into<String>>(message: S) -> Self {
        Self::InvalidInput { message: message.into() }
    }

    /// Inline, non-fatal message shown by the page controllers.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            LabError::Remote { message } => format!("Request failed: {message}"),
            LabError::NotFound { .. } => "City not found.".to_string(),
            LabError::Parse { message } => format!("Could not read the response: {message}"),
            LabError::InvalidInput { message } => message.clone(),
            LabError::Io { source } => format!("Could not read the file: {source}"),
        }
    }
}

// Only client construction converts directly; requests go through `http::transport_error`.
impl From<reqwest::Error> for LabError {
    fn from(err: reqwest::Error) -> Self {
        LabError::remote(err.to_string())
    }
}
