use std::fmt::Display;

use thiserror::Error;
use tracing::info;
use url::Url;

/// The navigation side effect could not be carried out. Informational only;
/// history is never rolled back because of it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Failed to open URL: {address}")]
pub struct OpenFailed {
    pub address: String,
    pub reason: String,
}

impl OpenFailed {
    fn new(address: &str, reason: impl Display) -> Self {
        Self {
            address: address.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Whatever actually takes the user to an address once history has moved.
pub trait Navigator {
    fn navigate(&mut self, address: &str) -> Result<(), OpenFailed>;
}

/// Hands the address to the platform's default handler.
pub struct SystemNavigator;

impl Navigator for SystemNavigator {
    fn navigate(&mut self, address: &str) -> Result<(), OpenFailed> {
        let url = Url::parse(address).map_err(|err| OpenFailed::new(address, err))?;
        open::that_detached(url.as_str()).map_err(|err| OpenFailed::new(address, err))?;
        info!(%url, "Opened");
        Ok(())
    }
}

/// Only writes the navigation to the log.
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn navigate(&mut self, address: &str) -> Result<(), OpenFailed> {
        info!(address, "Navigated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_navigator_rejects_unparseable_addresses() {
        let err = SystemNavigator.navigate("not a url").unwrap_err();
        assert_eq!(err.address, "not a url");
        assert!(!err.reason.is_empty());
        assert_eq!(err.to_string(), "Failed to open URL: not a url");
    }

    #[test]
    fn log_navigator_always_succeeds() {
        assert_eq!(LogNavigator.navigate("anything at all"), Ok(()));
    }
}
