//! In-memory implementations of the gateway's collaborators.
//!
//! # Purpose
//! These back the binary in development mode and the tests everywhere. They
//! use `HashMap`s guarded by `tokio::sync::RwLock`, the same dev-backend
//! shape the rest of the platform uses.
//!
//! # Durability and consistency
//! - **Not durable**: all state is lost on process restart.
//! - **Single-process**: multiple gateway instances do not share state; the
//!   real stores behind these traits are the coordination point.
use super::{
    AuthStore, BlockingOutcome, EntitlementError, EntitlementProvider, EntityStore, InvokeError,
    Invoker, StoreError, StoreResult,
};
use crate::model::{Action, Activation, ActivationResponse, Identity, Package};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::RwLock;

/// Identity records keyed by namespace and by auth-key uuid.
#[derive(Default)]
pub struct InMemoryAuthStore {
    by_namespace: RwLock<HashMap<String, Identity>>,
    by_key_uuid: RwLock<HashMap<String, Identity>>,
}

impl InMemoryAuthStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn put_identity(&self, identity: Identity) {
        self.by_key_uuid
            .write()
            .await
            .insert(identity.auth_key.uuid.clone(), identity.clone());
        self.by_namespace
            .write()
            .await
            .insert(identity.namespace.clone(), identity);
    }
}

#[async_trait]
impl AuthStore for InMemoryAuthStore {
    async fn identity_by_namespace(&self, namespace: &str) -> StoreResult<Identity> {
        self.by_namespace
            .read()
            .await
            .get(namespace)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("identity for namespace {namespace}")))
    }

    async fn identity_by_auth_key(&self, uuid: &str, secret: &str) -> StoreResult<Identity> {
        let identities = self.by_key_uuid.read().await;
        match identities.get(uuid) {
            Some(identity) if identity.auth_key.secret == secret => Ok(identity.clone()),
            _ => Err(StoreError::NotFound("auth key".to_string())),
        }
    }
}

/// Packages and actions keyed by their entity path.
///
/// Actions are keyed by `(<ns>[/<pkg>], name)`, matching how the action
/// record itself carries its namespace path.
#[derive(Default)]
pub struct InMemoryEntityStore {
    packages: RwLock<HashMap<(String, String), Package>>,
    actions: RwLock<HashMap<(String, String), Action>>,
}

impl InMemoryEntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn put_package(&self, package: Package) {
        self.packages
            .write()
            .await
            .insert((package.namespace.clone(), package.name.clone()), package);
    }

    pub async fn put_action(&self, action: Action) {
        self.actions
            .write()
            .await
            .insert((action.namespace.clone(), action.name.clone()), action);
    }
}

#[async_trait]
impl EntityStore for InMemoryEntityStore {
    async fn get_package(&self, namespace: &str, name: &str) -> StoreResult<Package> {
        self.packages
            .read()
            .await
            .get(&(namespace.to_string(), name.to_string()))
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("package {namespace}/{name}")))
    }

    async fn get_action(
        &self,
        namespace: &str,
        package: Option<&str>,
        name: &str,
    ) -> StoreResult<Action> {
        let path = match package {
            Some(package) => format!("{namespace}/{package}"),
            None => namespace.to_string(),
        };
        self.actions
            .read()
            .await
            .get(&(path.clone(), name.to_string()))
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("action {path}/{name}")))
    }

    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

/// Minute-bucketed activation counter per namespace.
///
/// Good enough for a single-process dev deployment; production entitlement
/// lives behind the trait in a shared service.
pub struct LocalEntitlement {
    default_limit: Option<u32>,
    counters: RwLock<HashMap<String, (u64, u32)>>,
}

impl LocalEntitlement {
    pub fn new(default_limit: Option<u32>) -> Self {
        Self {
            default_limit,
            counters: RwLock::new(HashMap::new()),
        }
    }

    fn current_minute() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs() / 60)
            .unwrap_or(0)
    }
}

#[async_trait]
impl EntitlementProvider for LocalEntitlement {
    async fn check(&self, identity: &Identity) -> Result<(), EntitlementError> {
        let limit = identity
            .limits
            .activations_per_minute
            .or(self.default_limit);
        let Some(limit) = limit else {
            return Ok(());
        };

        let minute = Self::current_minute();
        let mut counters = self.counters.write().await;
        let entry = counters
            .entry(identity.namespace.clone())
            .or_insert((minute, 0));
        if entry.0 != minute {
            *entry = (minute, 0);
        }
        if entry.1 >= limit {
            return Err(EntitlementError::Throttled(format!(
                "namespace {} exceeded its activation rate of {} per minute",
                identity.namespace, limit
            )));
        }
        entry.1 += 1;
        Ok(())
    }
}

type HandlerFn = dyn Fn(Value) -> ActivationResponse + Send + Sync;

enum FunctionBehavior {
    /// Run the handler, optionally after a simulated execution delay.
    Respond {
        handler: Arc<HandlerFn>,
        delay: Option<Duration>,
    },
    /// Accept the activation but never produce a result within any wait.
    NeverReady,
}

/// Invoker backed by a registry of in-process handler functions.
///
/// Handlers are keyed by the action's fully-qualified name. The wait bound
/// is honored: a handler whose simulated delay exceeds the wait yields a
/// timeout outcome exactly like a slow remote invoker would.
#[derive(Default)]
pub struct FunctionRegistry {
    functions: RwLock<HashMap<String, FunctionBehavior>>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register<F>(&self, fully_qualified_name: impl Into<String>, handler: F)
    where
        F: Fn(Value) -> ActivationResponse + Send + Sync + 'static,
    {
        self.functions.write().await.insert(
            fully_qualified_name.into(),
            FunctionBehavior::Respond {
                handler: Arc::new(handler),
                delay: None,
            },
        );
    }

    pub async fn register_slow<F>(
        &self,
        fully_qualified_name: impl Into<String>,
        delay: Duration,
        handler: F,
    ) where
        F: Fn(Value) -> ActivationResponse + Send + Sync + 'static,
    {
        self.functions.write().await.insert(
            fully_qualified_name.into(),
            FunctionBehavior::Respond {
                handler: Arc::new(handler),
                delay: Some(delay),
            },
        );
    }

    /// Register a function that is accepted but never completes in time.
    pub async fn register_detached(&self, fully_qualified_name: impl Into<String>) {
        self.functions
            .write()
            .await
            .insert(fully_qualified_name.into(), FunctionBehavior::NeverReady);
    }
}

#[async_trait]
impl Invoker for FunctionRegistry {
    async fn invoke_blocking(
        &self,
        _identity: &Identity,
        action: &Action,
        payload: Value,
        wait: Duration,
    ) -> Result<BlockingOutcome, InvokeError> {
        let activation_id = uuid::Uuid::new_v4().simple().to_string();
        let fully_qualified_name = action.fully_qualified_name();

        // Snapshot the behavior so the registry lock is not held while the
        // simulated execution sleeps.
        let behavior = {
            let functions = self.functions.read().await;
            match functions.get(&fully_qualified_name) {
                Some(FunctionBehavior::NeverReady) => None,
                Some(FunctionBehavior::Respond { handler, delay }) => {
                    Some((handler.clone(), *delay))
                }
                None => {
                    return Err(InvokeError::Unexpected(anyhow::anyhow!(
                        "no function registered for {fully_qualified_name}"
                    )));
                }
            }
        };

        match behavior {
            None => Ok(BlockingOutcome {
                activation_id,
                activation: None,
            }),
            Some((handler, delay)) => {
                if let Some(delay) = delay {
                    if delay > wait {
                        tokio::time::sleep(wait).await;
                        return Err(InvokeError::Timeout { activation_id });
                    }
                    tokio::time::sleep(delay).await;
                }
                let response = handler(payload);
                Ok(BlockingOutcome {
                    activation_id: activation_id.clone(),
                    activation: Some(Activation {
                        activation_id,
                        namespace: action.namespace.clone(),
                        name: action.name.clone(),
                        response,
                    }),
                })
            }
        }
    }
}
