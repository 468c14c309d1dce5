//! Error taxonomy shared by every stage of the briefing flow

/// A failure at one stage of the briefing flow.
///
/// The `Display` text is what the user sees in the `Error` state, so it never
/// contains email content or credentials.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FlowError {
    /// Authorization revoked, insufficient scopes or provider-side sign-in failure
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// The user aborted the interactive sign-in
    #[error("Sign-in was cancelled")]
    AuthCancelled,

    /// Transport failure (timeout, DNS, connection refused, ...)
    #[error("{0}")]
    Network(String),

    /// The summarization service answered with a non-2xx status
    #[error("Summary service returned HTTP {status}")]
    HttpStatus { status: u16 },

    /// A response body did not match the expected schema
    #[error("Could not decode response: {0}")]
    Decode(String),

    /// The mail provider rate-limited the request
    #[error("Mail provider rate limit reached: {0}")]
    Quota(String),

    /// Anything not classified above
    #[error("{0}")]
    Other(String),
}

impl FlowError {
    /// Whether re-triggering the flow without user action elsewhere can help
    pub fn is_transient(&self) -> bool {
        match self {
            FlowError::Network(_) | FlowError::Quota(_) => true,
            FlowError::HttpStatus { status } => *status >= 500,
            FlowError::Auth(_)
            | FlowError::AuthCancelled
            | FlowError::Decode(_)
            | FlowError::Other(_) => false,
        }
    }
}

impl From<anyhow::Error> for FlowError {
    fn from(e: anyhow::Error) -> Self {
        FlowError::Other(format!("{:#}", e))
    }
}

/// Result alias for stage operations
pub type FlowResult<T> = std::result::Result<T, FlowError>;
