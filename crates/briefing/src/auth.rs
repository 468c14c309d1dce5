//! Sign-in gate in front of the mail stage
//!
//! [`AuthGate`] hands the flow an [`Identity`]: the provider's cached one when
//! available, otherwise the result of an interactive consent step.

use log::{info, warn};
use std::sync::Arc;

use crate::error::FlowResult;
use crate::models::Identity;

/// Source of authenticated identities
///
/// Implemented by [`GmailAuth`](crate::gmail::GmailAuth) for desktop use and
/// by the mobile shell (native Google Sign-In) through the FFI layer.
pub trait IdentityProvider: Send + Sync {
    /// Whether a previous sign-in is stored; must not block on the network
    fn is_signed_in(&self) -> bool;

    /// Return a usable identity without user interaction, if one exists
    ///
    /// May refresh an expired token. `Ok(None)` means an interactive sign-in
    /// is required.
    fn cached_identity(&self) -> FlowResult<Option<Identity>>;

    /// Run the interactive consent step, blocking until the user finishes
    ///
    /// Fails with [`FlowError::AuthCancelled`](crate::FlowError::AuthCancelled)
    /// if the user aborts.
    fn sign_in(&self) -> FlowResult<Identity>;

    /// Forget the stored identity
    fn sign_out(&self) -> FlowResult<()>;

    /// Drop a cached identity the mail provider rejected, so the next flow
    /// prompts instead of reusing it
    fn invalidate(&self) -> FlowResult<()> {
        Ok(())
    }
}

/// Gate that resolves an identity before mail is accessed
#[derive(Clone)]
pub struct AuthGate {
    provider: Arc<dyn IdentityProvider>,
}

impl AuthGate {
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        Self { provider }
    }

    pub fn is_signed_in(&self) -> bool {
        self.provider.is_signed_in()
    }

    /// Cached identity only; never prompts
    pub fn cached_identity(&self) -> FlowResult<Option<Identity>> {
        self.provider.cached_identity()
    }

    /// Interactive consent step
    pub fn sign_in(&self) -> FlowResult<Identity> {
        info!("Interactive sign-in required");
        let identity = self.provider.sign_in()?;
        info!("Interactive sign-in completed");
        Ok(identity)
    }

    /// Return the cached identity, or prompt for a new one
    pub fn ensure_identity(&self) -> FlowResult<Identity> {
        match self.cached_identity()? {
            Some(identity) => Ok(identity),
            None => self.sign_in(),
        }
    }

    pub fn sign_out(&self) -> FlowResult<()> {
        self.provider.sign_out().inspect_err(|e| warn!("Sign-out failed: {}", e))
    }

    /// Discard a rejected identity; failures are logged, not returned
    pub fn invalidate(&self) {
        info!("Mail provider rejected the identity, discarding it");
        if let Err(e) = self.provider.invalidate() {
            warn!("Failed to discard rejected identity: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FlowError;
    use std::sync::Mutex;

    struct FakeProvider {
        cached: Option<Identity>,
        interactive: FlowResult<Identity>,
        prompts: Mutex<u32>,
    }

    impl IdentityProvider for FakeProvider {
        fn is_signed_in(&self) -> bool {
            self.cached.is_some()
        }

        fn cached_identity(&self) -> FlowResult<Option<Identity>> {
            Ok(self.cached.clone())
        }

        fn sign_in(&self) -> FlowResult<Identity> {
            *self.prompts.lock().unwrap() += 1;
            self.interactive.clone()
        }

        fn sign_out(&self) -> FlowResult<()> {
            Ok(())
        }
    }

    #[test]
    fn test_cached_identity_skips_prompt() {
        let provider = Arc::new(FakeProvider {
            cached: Some(Identity::new("cached")),
            interactive: Err(FlowError::AuthCancelled),
            prompts: Mutex::new(0),
        });
        let gate = AuthGate::new(provider.clone());

        let identity = gate.ensure_identity().unwrap();
        assert_eq!(identity.access_token(), "cached");
        assert_eq!(*provider.prompts.lock().unwrap(), 0);
    }

    #[test]
    fn test_missing_identity_prompts() {
        let provider = Arc::new(FakeProvider {
            cached: None,
            interactive: Ok(Identity::new("fresh").with_account("me@example.com")),
            prompts: Mutex::new(0),
        });
        let gate = AuthGate::new(provider.clone());

        let identity = gate.ensure_identity().unwrap();
        assert_eq!(identity.access_token(), "fresh");
        assert_eq!(*provider.prompts.lock().unwrap(), 1);
    }

    #[test]
    fn test_cancelled_prompt_surfaces() {
        let gate = AuthGate::new(Arc::new(FakeProvider {
            cached: None,
            interactive: Err(FlowError::AuthCancelled),
            prompts: Mutex::new(0),
        }));

        assert_eq!(gate.ensure_identity().unwrap_err(), FlowError::AuthCancelled);
    }

    /// Records every log message so tests can check what reaches the log
    struct CaptureLogger;

    static CAPTURED: Mutex<Vec<String>> = Mutex::new(Vec::new());

    impl log::Log for CaptureLogger {
        fn enabled(&self, _metadata: &log::Metadata) -> bool {
            true
        }

        fn log(&self, record: &log::Record) {
            CAPTURED
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
                .push(record.args().to_string());
        }

        fn flush(&self) {}
    }

    #[test]
    fn test_sign_in_keeps_account_address_out_of_logs() {
        static LOGGER: CaptureLogger = CaptureLogger;
        let _ = log::set_logger(&LOGGER);
        log::set_max_level(log::LevelFilter::Trace);

        let gate = AuthGate::new(Arc::new(FakeProvider {
            cached: None,
            interactive: Ok(Identity::new("fresh").with_account("private@example.com")),
            prompts: Mutex::new(0),
        }));
        gate.sign_in().unwrap();

        let captured = CAPTURED.lock().unwrap();
        assert!(captured.iter().any(|m| m.contains("sign-in completed")));
        assert!(!captured.iter().any(|m| m.contains("private@example.com")));
    }
}
