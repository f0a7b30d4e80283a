//! Resource lifecycle engine
//!
//! The LifecycleEngine is responsible for:
//! - Refreshing tracked resources against Route 53
//! - Planning create / update / replace / delete actions
//! - Applying plans with retries on throttling
//! - Persisting state after every successful action
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐
//! │ StackConfig  │─── declarations ───┐
//! └──────────────┘                    │
//!                                     ▼
//!                           ┌──────────────────┐
//!                           │ LifecycleEngine  │
//!                           └──────────────────┘
//!                                     │
//!         ┌───────────────────────────┼───────────────────────────┐
//!         │                           │                           │
//!         ▼                           ▼                           ▼
//! ┌─────────────┐           ┌──────────────────┐         ┌─────────────┐
//! │ StateStore  │           │ Resource (kind)  │         │   Events    │
//! │ (persist)   │           │ → Route53Api     │         │  (notify)   │
//! └─────────────┘           └──────────────────┘         └─────────────┘
//! ```
//!
//! ## Apply Flow
//!
//! 1. Delete tracked resources that are no longer declared, newest first
//! 2. For each declaration, in order: refresh, resolve references, act
//! 3. Persist state after each action, emit an event
//! 4. Flush the state store

mod dispatch;
mod interpolate;

use crate::config::{ResourceDeclaration, StackConfig};
use crate::error::{Error, Result};
use crate::resources::{ProviderContext, ResourceKind};
use crate::traits::{StateRecord, StateStore};
use dispatch::{DynResource, Observed, resource_for};
use interpolate::{Resolved, resolve};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::future::Future;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// What apply will do to one address
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanAction {
    /// Not tracked, or tracked but gone remotely
    Create,
    /// Tracked and changeable in place
    Update,
    /// Tracked but a change forces delete + create
    Replace,
    /// Tracked but no longer declared
    Delete,
    /// Already matches the declaration
    NoOp,
    /// Depends on resources whose attributes are not known yet
    Deferred {
        /// Unresolved references
        references: Vec<String>,
    },
}

impl fmt::Display for PlanAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanAction::Create => f.write_str("create"),
            PlanAction::Update => f.write_str("update"),
            PlanAction::Replace => f.write_str("replace"),
            PlanAction::Delete => f.write_str("delete"),
            PlanAction::NoOp => f.write_str("no-op"),
            PlanAction::Deferred { .. } => f.write_str("deferred"),
        }
    }
}

/// Planned action for one address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedChange {
    pub address: String,
    pub kind: ResourceKind,
    pub action: PlanAction,
}

/// Result of [`LifecycleEngine::plan`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    /// Orphan deletions first, then declarations in order
    pub changes: Vec<PlannedChange>,
}

impl Plan {
    /// Whether applying would change anything
    pub fn has_changes(&self) -> bool {
        self.changes.iter().any(|c| c.action != PlanAction::NoOp)
    }

    /// Number of changes with the given action
    pub fn count(&self, action: &PlanAction) -> usize {
        self.changes
            .iter()
            .filter(|c| std::mem::discriminant(&c.action) == std::mem::discriminant(action))
            .count()
    }

    /// The planned action for an address
    pub fn action(&self, address: &str) -> Option<&PlanAction> {
        self.changes
            .iter()
            .find(|c| c.address == address)
            .map(|c| &c.action)
    }
}

/// Events emitted by the LifecycleEngine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// A plan was computed
    Planned {
        creates: usize,
        updates: usize,
        replaces: usize,
        deletes: usize,
    },

    /// A tracked resource no longer exists remotely
    Drifted { address: String, id: String },

    /// An action started
    ActionStarted { address: String, action: String },

    /// An action succeeded
    ActionSucceeded {
        address: String,
        action: String,
        id: String,
    },

    /// An action failed after all retries
    ActionFailed {
        address: String,
        action: String,
        error: String,
        retry_count: usize,
    },

    /// A remote object was adopted into state
    Imported { address: String, id: String },
}

/// Summary of an apply or destroy
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplySummary {
    pub created: usize,
    pub updated: usize,
    pub replaced: usize,
    pub deleted: usize,
    pub unchanged: usize,
}

/// A refreshed declaration
struct Refreshed {
    /// State record before this run
    record: Option<StateRecord>,
    /// Current remote object; `None` when untracked or gone
    current: Option<Observed>,
}

/// Resource lifecycle engine
///
/// ## Lifecycle
///
/// 1. Create with [`LifecycleEngine::new()`]
/// 2. [`plan`](Self::plan) to preview, [`apply`](Self::apply) to converge,
///    [`destroy`](Self::destroy) to tear down
/// 3. Drain the event receiver for progress reporting
///
/// ## Ordering
///
/// Declarations are processed in order, so a declaration may only reference
/// declarations above it. Deletions run newest first.
pub struct LifecycleEngine {
    /// Route 53 client and wait timeouts
    ctx: ProviderContext,

    /// State store
    state_store: Box<dyn StateStore>,

    /// Declared resources, in order
    resources: Vec<ResourceDeclaration>,

    /// Maximum retry attempts
    max_retries: usize,

    /// Delay between retries (in seconds)
    retry_delay_secs: u64,

    /// Event sender for external monitoring
    event_tx: mpsc::Sender<EngineEvent>,
}

impl LifecycleEngine {
    /// Create a new engine
    ///
    /// # Returns
    ///
    /// A tuple of (engine, event_receiver) where event_receiver yields engine events
    pub fn new(
        ctx: ProviderContext,
        state_store: Box<dyn StateStore>,
        config: StackConfig,
    ) -> Result<(Self, mpsc::Receiver<EngineEvent>)> {
        config.validate()?;

        let (tx, rx) = mpsc::channel(config.engine.event_channel_capacity);

        let engine = Self {
            ctx,
            state_store,
            resources: config.resources,
            max_retries: config.engine.max_retries,
            retry_delay_secs: config.engine.retry_delay_secs,
            event_tx: tx,
        };

        Ok((engine, rx))
    }

    /// The state store backing this engine
    pub fn state_store(&self) -> &dyn StateStore {
        self.state_store.as_ref()
    }

    /// Compute the actions apply would take, without changing anything
    pub async fn plan(&self) -> Result<Plan> {
        let mut plan = Plan::default();
        let mut states: HashMap<String, Value> = HashMap::new();

        for record in self.orphans().await? {
            plan.changes.push(PlannedChange {
                address: record.0,
                kind: record.1.kind,
                action: PlanAction::Delete,
            });
        }

        for decl in &self.resources {
            let resource = resource_for(decl.kind);
            let refreshed = self.refresh(decl).await?;

            let action = match resolve(&decl.config, &states)? {
                Resolved::Pending(references) => PlanAction::Deferred { references },
                Resolved::Ready(config) => {
                    resource.validate(&config)?;
                    Self::decide(resource.as_ref(), decl.kind, &refreshed, &config)?
                }
            };
            debug!(address = %decl.address, action = %action, "Planned");

            if let Some((_, state)) = refreshed.current {
                states.insert(decl.address.clone(), state);
            }
            plan.changes.push(PlannedChange {
                address: decl.address.clone(),
                kind: decl.kind,
                action,
            });
        }

        self.emit_event(EngineEvent::Planned {
            creates: plan.count(&PlanAction::Create),
            updates: plan.count(&PlanAction::Update),
            replaces: plan.count(&PlanAction::Replace),
            deletes: plan.count(&PlanAction::Delete),
        });
        Ok(plan)
    }

    /// Converge Route 53 on the declarations
    ///
    /// Stops at the first action that fails after retries; state written
    /// for earlier actions is kept.
    pub async fn apply(&self) -> Result<ApplySummary> {
        let mut summary = ApplySummary::default();
        let mut states: HashMap<String, Value> = HashMap::new();

        for (address, record) in self.orphans().await? {
            self.delete_tracked(&address, &record).await?;
            summary.deleted += 1;
        }

        for decl in &self.resources {
            let resource = resource_for(decl.kind);
            let refreshed = self.refresh(decl).await?;

            let config = match resolve(&decl.config, &states)? {
                Resolved::Ready(config) => config,
                Resolved::Pending(references) => {
                    return Err(Error::config(format!(
                        "{} references unknown resources: {}",
                        decl.address,
                        references.join(", ")
                    )));
                }
            };
            resource.validate(&config)?;

            let action = Self::decide(resource.as_ref(), decl.kind, &refreshed, &config)?;
            let (id, state) = match (&action, refreshed.record, refreshed.current) {
                (PlanAction::NoOp, Some(record), Some((id, state))) => {
                    self.state_store
                        .set(&decl.address, &record.updated(&id, state.clone()))
                        .await?;
                    summary.unchanged += 1;
                    (id, state)
                }
                (PlanAction::Update, Some(record), Some((_, prior))) => {
                    let (r, prior, config) = (resource.as_ref(), &prior, &config);
                    let (id, state) = self
                        .with_retry(&decl.address, &action, move || {
                            r.update(&self.ctx, prior, config)
                        })
                        .await?;
                    self.state_store
                        .set(&decl.address, &record.updated(&id, state.clone()))
                        .await?;
                    summary.updated += 1;
                    (id, state)
                }
                (PlanAction::Replace, Some(record), _) => {
                    self.delete_tracked(&decl.address, &record).await?;
                    let observed = self.create(decl, resource.as_ref(), &config).await?;
                    summary.replaced += 1;
                    observed
                }
                _ => {
                    let observed = self.create(decl, resource.as_ref(), &config).await?;
                    summary.created += 1;
                    observed
                }
            };

            if action != PlanAction::NoOp {
                self.emit_event(EngineEvent::ActionSucceeded {
                    address: decl.address.clone(),
                    action: action.to_string(),
                    id,
                });
            }
            states.insert(decl.address.clone(), state);
        }

        self.state_store.flush().await?;
        info!(
            created = summary.created,
            updated = summary.updated,
            replaced = summary.replaced,
            deleted = summary.deleted,
            "Apply complete"
        );
        Ok(summary)
    }

    /// Delete every tracked resource
    ///
    /// Declared resources go in reverse declaration order, then anything else
    /// still tracked, newest first.
    pub async fn destroy(&self) -> Result<ApplySummary> {
        let mut summary = ApplySummary::default();

        for decl in self.resources.iter().rev() {
            if let Some(record) = self.state_store.get(&decl.address).await? {
                self.delete_tracked(&decl.address, &record).await?;
                summary.deleted += 1;
            }
        }
        for (address, record) in self.orphans().await? {
            self.delete_tracked(&address, &record).await?;
            summary.deleted += 1;
        }

        self.state_store.flush().await?;
        info!(deleted = summary.deleted, "Destroy complete");
        Ok(summary)
    }

    /// Adopt an existing remote object under `address`
    pub async fn import(&self, address: &str, kind: ResourceKind, id: &str) -> Result<StateRecord> {
        if self.state_store.get(address).await?.is_some() {
            return Err(Error::config(format!("{address} is already managed")));
        }
        if let Some(decl) = self.resources.iter().find(|d| d.address == address) {
            if decl.kind != kind {
                return Err(Error::config(format!(
                    "{address} is declared as {}, not {kind}",
                    decl.kind
                )));
            }
        }

        let resource = resource_for(kind);
        let r = resource.as_ref();
        let (id, state) = self
            .with_retry(address, &PlanAction::Create, move || r.import(&self.ctx, id))
            .await?;
        let record = StateRecord::new(kind, &id, state);
        self.state_store.set(address, &record).await?;
        self.state_store.flush().await?;

        info!(address, id = %id, "Imported");
        self.emit_event(EngineEvent::Imported {
            address: address.to_string(),
            id,
        });
        Ok(record)
    }

    /// Tracked addresses without a declaration, newest first
    async fn orphans(&self) -> Result<Vec<(String, StateRecord)>> {
        let declared: HashSet<&str> = self.resources.iter().map(|d| d.address.as_str()).collect();
        let mut orphans = Vec::new();
        for address in self.state_store.list().await? {
            if declared.contains(address.as_str()) {
                continue;
            }
            if let Some(record) = self.state_store.get(&address).await? {
                orphans.push((address, record));
            }
        }
        orphans.sort_by(|a, b| b.1.created_at.cmp(&a.1.created_at));
        Ok(orphans)
    }

    /// Read the remote object a declaration tracks
    async fn refresh(&self, decl: &ResourceDeclaration) -> Result<Refreshed> {
        let Some(record) = self.state_store.get(&decl.address).await? else {
            return Ok(Refreshed {
                record: None,
                current: None,
            });
        };

        let resource = resource_for(record.kind);
        let (r, id) = (resource.as_ref(), record.id.as_str());
        let current = match self
            .with_retry(&decl.address, &PlanAction::NoOp, move || r.read(&self.ctx, id))
            .await?
        {
            Some(observed) => Some(r.keep_local(&record.attributes, observed)?),
            None => None,
        };

        if current.is_none() {
            warn!(address = %decl.address, id = %record.id, "Resource no longer exists remotely");
            self.emit_event(EngineEvent::Drifted {
                address: decl.address.clone(),
                id: record.id.clone(),
            });
        }
        Ok(Refreshed {
            record: Some(record),
            current,
        })
    }

    /// Pick the action for a refreshed declaration
    fn decide(
        resource: &dyn DynResource,
        kind: ResourceKind,
        refreshed: &Refreshed,
        config: &Value,
    ) -> Result<PlanAction> {
        let (Some(record), Some((_, state))) = (&refreshed.record, &refreshed.current) else {
            return Ok(PlanAction::Create);
        };
        if record.kind != kind || resource.requires_replacement(state, config)? {
            return Ok(PlanAction::Replace);
        }
        if resource.in_sync(state, config)? {
            Ok(PlanAction::NoOp)
        } else {
            Ok(PlanAction::Update)
        }
    }

    async fn create(
        &self,
        decl: &ResourceDeclaration,
        resource: &dyn DynResource,
        config: &Value,
    ) -> Result<Observed> {
        let created = self
            .with_retry(&decl.address, &PlanAction::Create, move || {
                resource.create(&self.ctx, config)
            })
            .await;

        let (id, state) = match created {
            Ok(observed) => observed,
            Err(e) => {
                // track the object so the next run refreshes it instead of creating another
                if let Error::Incomplete { id, .. } = &e {
                    warn!(address = %decl.address, id = %id, "Tracking partially created resource");
                    self.state_store
                        .set(&decl.address, &StateRecord::new(decl.kind, id, Value::Null))
                        .await?;
                }
                return Err(e);
            }
        };
        self.state_store
            .set(&decl.address, &StateRecord::new(decl.kind, &id, state.clone()))
            .await?;
        Ok((id, state))
    }

    /// Delete a tracked object and forget it
    async fn delete_tracked(&self, address: &str, record: &StateRecord) -> Result<()> {
        let resource = resource_for(record.kind);
        let r = resource.as_ref();

        let state = if record.attributes.is_null() {
            // partially created: delete what is there now
            let id = record.id.as_str();
            self.with_retry(address, &PlanAction::NoOp, move || r.read(&self.ctx, id))
                .await?
                .map(|(_, state)| state)
        } else {
            Some(record.attributes.clone())
        };

        if let Some(state) = &state {
            self.with_retry(address, &PlanAction::Delete, move || r.delete(&self.ctx, state))
                .await?;
        }
        self.state_store.delete(address).await?;

        self.emit_event(EngineEvent::ActionSucceeded {
            address: address.to_string(),
            action: PlanAction::Delete.to_string(),
            id: record.id.clone(),
        });
        Ok(())
    }

    /// Run `op`, retrying retryable failures
    async fn with_retry<T, F, Fut>(&self, address: &str, action: &PlanAction, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if *action != PlanAction::NoOp {
            self.emit_event(EngineEvent::ActionStarted {
                address: address.to_string(),
                action: action.to_string(),
            });
        }

        let mut attempt = 0;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    attempt += 1;
                    warn!(
                        address,
                        action = %action,
                        attempt,
                        "Retryable failure: {}", e
                    );
                    tokio::time::sleep(std::time::Duration::from_secs(self.retry_delay_secs)).await;
                }
                Err(e) => {
                    self.emit_event(EngineEvent::ActionFailed {
                        address: address.to_string(),
                        action: action.to_string(),
                        error: e.to_string(),
                        retry_count: attempt,
                    });
                    return Err(e);
                }
            }
        }
    }

    /// Emit an engine event
    fn emit_event(&self, event: EngineEvent) {
        // Send event, logging warning if channel is full (backpressure)
        if self.event_tx.try_send(event).is_err() {
            warn!("Event channel full, dropping event. Consider increasing event_channel_capacity.");
        }
    }
}
