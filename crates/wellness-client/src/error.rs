use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Session storage failed: {0}")]
    Session(#[from] std::io::Error),

    #[error("Not signed in")]
    NotAuthenticated,

    #[error("Unknown challenge {0}")]
    UnknownChallenge(u32),
}

impl ClientError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Api { status: 401, .. } | Self::NotAuthenticated)
    }
}
