//! Change-propagation waiter
//!
//! Route 53 applies most mutations asynchronously. The helpers here poll a
//! status until it reaches a target state:
//!
//! ```text
//!  jittered initial delay ──▶ refresh ──▶ target?  ──▶ done
//!                               ▲   │
//!                               │   ├──▶ pending?  ──▶ sleep(poll_interval)
//!                               └───┘
//!                                   └──▶ other     ──▶ UnexpectedState
//! ```
//!
//! The overall deadline covers the initial delay. Exceeding it fails with
//! [`Error::Timeout`], carrying the last observed state.

use rand::Rng;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::model::{
    ChangeInfo, ChangeStatus, DnssecInfo, KeySigningKey, KeySigningKeyStatus, ServeSignature,
    TrafficPolicyInstance, TrafficPolicyInstanceState,
};
use crate::traits::Route53Api;

/// Polling parameters of one wait
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitConfig {
    /// Lower bound of the initial delay
    pub min_delay: Duration,
    /// Upper bound of the initial delay
    pub max_delay: Duration,
    /// Delay between refreshes
    pub poll_interval: Duration,
    /// Overall deadline
    pub timeout: Duration,
    /// Consecutive "not found" refreshes tolerated before giving up
    pub not_found_checks: u32,
}

impl WaitConfig {
    /// Default jitter and polling with the given deadline
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            min_delay: Duration::from_secs(10),
            max_delay: Duration::from_secs(30),
            poll_interval: Duration::from_secs(15),
            timeout,
            not_found_checks: 20,
        }
    }

    /// No delays at all; for tests and fakes that settle instantly
    pub fn immediate() -> Self {
        Self {
            min_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            poll_interval: Duration::ZERO,
            timeout: Duration::from_secs(60),
            not_found_checks: 20,
        }
    }

    fn initial_delay(&self) -> Duration {
        if self.max_delay <= self.min_delay {
            return self.min_delay;
        }
        rand::thread_rng().gen_range(self.min_delay..=self.max_delay)
    }
}

/// Poll `refresh` until it reports one of the `target` states
///
/// `refresh` returns `Ok(Some((value, state)))` for an observed object,
/// `Ok(None)` when the object cannot be found, or an error. Retryable errors
/// count as one more pending poll; any other error ends the wait.
pub async fn wait_for_state<T, S, F, Fut>(
    what: &str,
    config: &WaitConfig,
    pending: &[S],
    target: &[S],
    mut refresh: F,
) -> Result<T>
where
    S: PartialEq + Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<(T, S)>>>,
{
    let started = Instant::now();
    let deadline = started + config.timeout;
    let mut last_state: Option<String> = None;
    let mut not_found = 0u32;

    tokio::time::sleep(config.initial_delay()).await;

    loop {
        match refresh().await {
            Err(e) if e.is_retryable() => {
                warn!(what, "Refresh failed, polling again: {}", e);
            }
            Err(e) => return Err(e),
            Ok(Some((value, state))) => {
                not_found = 0;
                debug!(what, state = %state, "Polled state");
                if target.contains(&state) {
                    return Ok(value);
                }
                if !pending.contains(&state) {
                    return Err(Error::UnexpectedState {
                        what: what.to_string(),
                        state: state.to_string(),
                        expected: pending.iter().chain(target).map(|s| s.to_string()).collect(),
                    });
                }
                last_state = Some(state.to_string());
            }
            Ok(None) => {
                not_found += 1;
                debug!(what, attempt = not_found, "Polled object not found");
                if not_found > config.not_found_checks {
                    return Err(Error::not_found(format!(
                        "{what} not found after {not_found} checks"
                    )));
                }
            }
        }

        if Instant::now() + config.poll_interval > deadline {
            return Err(Error::Timeout {
                what: what.to_string(),
                waited: started.elapsed(),
                last_state,
            });
        }
        tokio::time::sleep(config.poll_interval).await;
    }
}

/// Poll `refresh` until the object disappears
///
/// Any observed state must be in `pending`.
pub async fn wait_until_gone<T, S, F, Fut>(
    what: &str,
    config: &WaitConfig,
    pending: &[S],
    mut refresh: F,
) -> Result<()>
where
    S: PartialEq + Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<(T, S)>>>,
{
    let started = Instant::now();
    let deadline = started + config.timeout;
    let mut last_state: Option<String> = None;

    tokio::time::sleep(config.initial_delay()).await;

    loop {
        match refresh().await {
            Ok(None) => return Ok(()),
            Err(e) if e.is_not_found() => return Ok(()),
            Err(e) if e.is_retryable() => {
                warn!(what, "Refresh failed, polling again: {}", e);
            }
            Err(e) => return Err(e),
            Ok(Some((_, state))) => {
                debug!(what, state = %state, "Waiting for deletion");
                if !pending.contains(&state) {
                    return Err(Error::UnexpectedState {
                        what: what.to_string(),
                        state: state.to_string(),
                        expected: pending.iter().map(|s| s.to_string()).collect(),
                    });
                }
                last_state = Some(state.to_string());
            }
        }

        if Instant::now() + config.poll_interval > deadline {
            return Err(Error::Timeout {
                what: what.to_string(),
                waited: started.elapsed(),
                last_state,
            });
        }
        tokio::time::sleep(config.poll_interval).await;
    }
}

/// Wait for a change to reach INSYNC
///
/// Returns immediately when the change is already in sync.
pub async fn wait_for_change_insync(
    api: &dyn Route53Api,
    change: &ChangeInfo,
    config: &WaitConfig,
) -> Result<ChangeInfo> {
    if change.is_insync() {
        return Ok(change.clone());
    }

    let what = format!("change {}", change.id);
    wait_for_state(
        &what,
        config,
        &[ChangeStatus::Pending],
        &[ChangeStatus::Insync],
        move || async move {
            let info = api.get_change(&change.id).await?;
            let status = info.status;
            Ok(Some((info, status)))
        },
    )
    .await
}

/// Wait for a zone's DNSSEC signing status
pub async fn wait_for_serve_signature(
    api: &dyn Route53Api,
    zone_id: &str,
    target: ServeSignature,
    config: &WaitConfig,
) -> Result<DnssecInfo> {
    let what = format!("DNSSEC signing of zone {zone_id}");
    let pending: Vec<ServeSignature> = [
        ServeSignature::Signing,
        ServeSignature::NotSigning,
        ServeSignature::Deleting,
    ]
    .into_iter()
    .filter(|s| *s != target)
    .collect();

    wait_for_state(&what, config, &pending, &[target], move || async move {
        let info = api.get_dnssec(zone_id).await?;
        let status = info.serve_signature;
        Ok(Some((info, status)))
    })
    .await
}

/// Wait for a key-signing key to reach `target`
pub async fn wait_for_key_signing_key_status(
    api: &dyn Route53Api,
    zone_id: &str,
    name: &str,
    target: KeySigningKeyStatus,
    config: &WaitConfig,
) -> Result<KeySigningKey> {
    let what = format!("key signing key {name} in zone {zone_id}");
    let pending: Vec<KeySigningKeyStatus> = [KeySigningKeyStatus::Active, KeySigningKeyStatus::Inactive]
        .into_iter()
        .filter(|s| *s != target)
        .collect();

    wait_for_state(&what, config, &pending, &[target], move || async move {
        let info = api.get_dnssec(zone_id).await?;
        Ok(info.key(name).cloned().map(|key| {
            let status = key.status;
            (key, status)
        }))
    })
    .await
}

/// Wait for a traffic policy instance to be applied
///
/// A `Failed` instance ends the wait with its failure message.
pub async fn wait_for_traffic_policy_instance(
    api: &dyn Route53Api,
    id: &str,
    config: &WaitConfig,
) -> Result<TrafficPolicyInstance> {
    let what = format!("traffic policy instance {id}");
    let result = wait_for_state(
        &what,
        config,
        &[TrafficPolicyInstanceState::Creating, TrafficPolicyInstanceState::Updating],
        &[TrafficPolicyInstanceState::Applied],
        move || async move {
            match api.get_traffic_policy_instance(id).await {
                Ok(instance) => {
                    let state = instance.state;
                    Ok(Some((instance, state)))
                }
                Err(e) if e.is_not_found() => Ok(None),
                Err(e) => Err(e),
            }
        },
    )
    .await;

    match result {
        Err(Error::UnexpectedState { state, .. })
            if state == TrafficPolicyInstanceState::Failed.to_string() =>
        {
            let message = api
                .get_traffic_policy_instance(id)
                .await
                .ok()
                .and_then(|i| i.message)
                .unwrap_or_else(|| "no message".to_string());
            Err(Error::Other(format!("{what} failed: {message}")))
        }
        other => other,
    }
}

/// Wait for a traffic policy instance to disappear
pub async fn wait_for_traffic_policy_instance_deleted(
    api: &dyn Route53Api,
    id: &str,
    config: &WaitConfig,
) -> Result<()> {
    let what = format!("deletion of traffic policy instance {id}");
    wait_until_gone(&what, config, &[TrafficPolicyInstanceState::Deleting], move || async move {
        let instance = api.get_traffic_policy_instance(id).await?;
        let state = instance.state;
        Ok(Some((instance, state)))
    })
    .await
}
