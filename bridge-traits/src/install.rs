//! Installable-App Prompt Abstraction
//!
//! Wraps the browser's deferred `beforeinstallprompt` event. The host captures
//! the event and hands it to the core, which later calls [`InstallPrompt::prompt`]
//! in response to a user gesture and awaits [`InstallPrompt::user_choice`].

use serde::{Deserialize, Serialize};

use crate::{error::Result, platform::PlatformSendSync};

/// What the user answered when shown the install prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstallOutcome {
    Accepted,
    Dismissed,
}

impl InstallOutcome {
    /// Map the `userChoice.outcome` string reported by browsers.
    pub fn from_outcome(outcome: &str) -> Self {
        if outcome == "accepted" {
            InstallOutcome::Accepted
        } else {
            InstallOutcome::Dismissed
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            InstallOutcome::Accepted => "accepted",
            InstallOutcome::Dismissed => "dismissed",
        }
    }
}

/// A captured, not-yet-shown install prompt.
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait InstallPrompt: PlatformSendSync {
    /// Show the platform install dialog.
    async fn prompt(&self) -> Result<()>;

    /// Resolve once the user has answered the dialog.
    async fn user_choice(&self) -> Result<InstallOutcome>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_mapping() {
        assert_eq!(InstallOutcome::from_outcome("accepted"), InstallOutcome::Accepted);
        assert_eq!(InstallOutcome::from_outcome("dismissed"), InstallOutcome::Dismissed);
        assert_eq!(InstallOutcome::from_outcome(""), InstallOutcome::Dismissed);
        assert_eq!(InstallOutcome::Accepted.as_str(), "accepted");
    }
}
