//! Authenticated account handle

use std::fmt;

/// An authenticated Google account, as handed out by an identity provider
///
/// Carries the OAuth access token used for mail calls. The token is kept out
/// of `Debug` output so an identity can be logged safely.
#[derive(Clone, PartialEq, Eq)]
pub struct Identity {
    access_token: String,
    account: Option<String>,
}

impl Identity {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            account: None,
        }
    }

    /// Attach the account e-mail address, when the provider knows it
    pub fn with_account(mut self, account: impl Into<String>) -> Self {
        self.account = Some(account.into());
        self
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn account(&self) -> Option<&str> {
        self.account.as_deref()
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("account", &self.account)
            .field("access_token", &"<redacted>")
            .finish()
    }
}
