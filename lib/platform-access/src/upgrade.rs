//! Appliance upgrade status and the bounded poller that watches an upgrade.
//!
//! After `POST /upgrade` succeeds the appliance restarts into the new
//! version. The console re-reads `/upgrade` on a fixed interval; the first
//! successful read means the new version is serving. After
//! [`MAX_UPGRADE_CHECKS`] attempts the upgrade is declared failed.

use crate::error::ApiError;
use crate::session::SessionToken;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Attempt number at which an upgrade is declared failed.
pub const MAX_UPGRADE_CHECKS: u32 = 20;

/// Delay between two status checks.
pub const UPGRADE_CHECK_INTERVAL: Duration = Duration::from_secs(20);

/// Body of `GET /upgrade`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UpgradeStatus {
    pub current_version: String,
    pub new_version_available: bool,
    pub new_version: String,
}

/// Transport for the upgrade endpoints. Both require a bearer token.
#[async_trait(?Send)]
pub trait UpgradeApi {
    /// `GET /upgrade`.
    async fn upgrade_status(&self, token: &SessionToken) -> Result<UpgradeStatus, ApiError>;

    /// `POST /upgrade`.
    async fn start_upgrade(&self, token: &SessionToken) -> Result<(), ApiError>;
}

/// Where an upgrade stands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UpgradeState {
    #[default]
    Idle,
    /// Waiting for the new version; `attempt` counts from 1.
    Upgrading { attempt: u32 },
    Completed,
    Failed,
}

/// Bounded-retry tracker for a running upgrade.
///
/// The tracker holds no timer. Its owner calls [`UpgradeTracker::tick`] every
/// [`UPGRADE_CHECK_INTERVAL`] while [`UpgradeTracker::is_polling`] holds and
/// stops the timer when it is dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpgradeTracker {
    state: UpgradeState,
    error: Option<String>,
}

impl UpgradeTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> UpgradeState {
        self.state
    }

    /// Returns true while the status must be re-checked.
    #[must_use]
    pub fn is_polling(&self) -> bool {
        matches!(self.state, UpgradeState::Upgrading { .. })
    }

    /// Records that `POST /upgrade` was accepted.
    pub fn started(&mut self) {
        debug!("upgrade started");
        self.error = None;
        self.state = UpgradeState::Upgrading { attempt: 1 };
    }

    /// Records that `POST /upgrade` failed. The tracker stays idle.
    pub fn start_failed(&mut self, err: &ApiError) {
        warn!(error = %err, "upgrade request failed");
        self.error = Some(format!("Error: {err}"));
    }

    /// Advances the attempt counter. Returns true if the status should be
    /// fetched again, false once polling has ended.
    pub fn tick(&mut self) -> bool {
        let UpgradeState::Upgrading { attempt } = self.state else {
            return false;
        };
        let attempt = attempt + 1;
        if attempt >= MAX_UPGRADE_CHECKS {
            warn!(attempt, "upgrade did not complete in time");
            self.state = UpgradeState::Failed;
            self.error = Some("Upgrade Failed. Check the logs on the instance".to_string());
            return false;
        }
        self.state = UpgradeState::Upgrading { attempt };
        true
    }

    /// Records a status read. A successful read while upgrading means the
    /// new version is serving.
    pub fn observe(&mut self, status: &Result<UpgradeStatus, ApiError>) {
        if let (UpgradeState::Upgrading { attempt }, Ok(status)) = (self.state, status) {
            debug!(attempt, version = %status.current_version, "upgrade completed");
            self.state = UpgradeState::Completed;
        }
    }

    /// Progress message shown while upgrading.
    #[must_use]
    pub fn progress_message(&self) -> Option<String> {
        match self.state {
            UpgradeState::Upgrading { attempt } => Some(format!(
                "Upgrade in progress. Waiting for new version to become available \
                 ({attempt}/{MAX_UPGRADE_CHECKS})..."
            )),
            _ => None,
        }
    }

    /// Error message, if starting or completing the upgrade failed.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}
