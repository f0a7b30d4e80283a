// # Resource Trait
//
// One implementation per Route 53 concept. A resource translates its
// declared configuration into API calls and the API's answers into state.

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt::Debug;

use crate::error::{Error, Result};
use crate::resources::{ProviderContext, ResourceKind};

/// Lifecycle of one kind of Route 53 object
///
/// Implementations are stateless unit structs; everything they need comes
/// from the [`ProviderContext`], the declared `Config` and the prior `State`.
///
/// # Contract
///
/// - `create` returns only once Route 53 reports the change as propagated
/// - `read` returns `Ok(None)` when the remote object is gone
/// - `update` is only called when `requires_replacement` is false
/// - `delete` treats an already-missing object as success
#[async_trait]
pub trait Resource: Send + Sync + 'static {
    /// Kind tag used in configuration and state
    const KIND: ResourceKind;

    /// Declared attributes
    type Config: Serialize + DeserializeOwned + Clone + Debug + Send + Sync;

    /// Attributes persisted after every successful operation
    type State: Serialize + DeserializeOwned + Clone + Debug + Send + Sync;

    /// Remote identifier of a managed object, in import-ID format
    fn id(&self, state: &Self::State) -> String;

    /// Reject configurations Route 53 would refuse
    fn validate(&self, _config: &Self::Config) -> Result<()> {
        Ok(())
    }

    /// Create the remote object
    async fn create(&self, ctx: &ProviderContext, config: &Self::Config) -> Result<Self::State>;

    /// Read the remote object by ID
    async fn read(&self, ctx: &ProviderContext, id: &str) -> Result<Option<Self::State>>;

    /// Bring the remote object in line with `config`
    async fn update(
        &self,
        ctx: &ProviderContext,
        prior: &Self::State,
        config: &Self::Config,
    ) -> Result<Self::State>;

    /// Delete the remote object
    async fn delete(&self, ctx: &ProviderContext, state: &Self::State) -> Result<()>;

    /// Adopt an existing remote object
    async fn import(&self, ctx: &ProviderContext, id: &str) -> Result<Self::State> {
        self.read(ctx, id)
            .await?
            .ok_or_else(|| Error::not_found(format!("{} {id} does not exist", Self::KIND)))
    }

    /// Carry settings that exist only in state from `stored` onto a fresh read
    fn keep_local(&self, _stored: &Self::State, observed: Self::State) -> Self::State {
        observed
    }

    /// Whether moving from `prior` to `config` needs delete + create
    fn requires_replacement(&self, _prior: &Self::State, _config: &Self::Config) -> bool {
        false
    }

    /// Whether `prior` already matches `config`
    fn in_sync(&self, prior: &Self::State, config: &Self::Config) -> bool;
}
