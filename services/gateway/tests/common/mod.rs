//! Shared test harness: an in-process gateway over the memory backends.
use axum::response::Response;
use axum::Router;
use gateway::app::{build_router, AppState};
use gateway::config::GatewayConfig;
use gateway::model::{
    Action, Annotations, AuthKey, Identity, Limits, Package, Parameters, WEB_EXPORT_ANNOTATION,
};
use gateway::store::memory::{
    FunctionRegistry, InMemoryAuthStore, InMemoryEntityStore, LocalEntitlement,
};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

pub struct TestGateway {
    pub auth: Arc<InMemoryAuthStore>,
    pub entities: Arc<InMemoryEntityStore>,
    pub invoker: Arc<FunctionRegistry>,
    pub config: GatewayConfig,
}

pub fn test_config() -> GatewayConfig {
    GatewayConfig {
        bind_addr: "127.0.0.1:0".parse::<SocketAddr>().unwrap(),
        metrics_bind: "127.0.0.1:0".parse::<SocketAddr>().unwrap(),
        api_prefix: "/api/v1".to_string(),
        max_entity_size: gateway::config::DEFAULT_MAX_ENTITY_SIZE,
        max_blocking_wait: Duration::from_millis(250),
        body_read_timeout: Duration::from_secs(5),
        enforce_extension: false,
    }
}

impl TestGateway {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: GatewayConfig) -> Self {
        Self {
            auth: Arc::new(InMemoryAuthStore::new()),
            entities: Arc::new(InMemoryEntityStore::new()),
            invoker: Arc::new(FunctionRegistry::new()),
            config,
        }
    }

    pub fn router(&self) -> Router {
        build_router(AppState {
            config: Arc::new(self.config.clone()),
            auth: self.auth.clone(),
            entities: self.entities.clone(),
            entitlement: Arc::new(LocalEntitlement::new(None)),
            invoker: self.invoker.clone(),
        })
    }

    pub async fn seed_owner(&self, namespace: &str) -> Identity {
        self.seed_owner_with_limit(namespace, None).await
    }

    pub async fn seed_owner_with_limit(
        &self,
        namespace: &str,
        activations_per_minute: Option<u32>,
    ) -> Identity {
        let identity = Identity {
            subject: format!("{namespace}-subject"),
            namespace: namespace.to_string(),
            auth_key: AuthKey {
                uuid: format!("{namespace}-key"),
                secret: format!("{namespace}-secret"),
            },
            limits: Limits {
                activations_per_minute,
            },
        };
        self.auth.put_identity(identity.clone()).await;
        identity
    }

    pub async fn seed_package(&self, namespace: &str, name: &str, parameters: Parameters) {
        self.entities
            .put_package(Package {
                namespace: namespace.to_string(),
                name: name.to_string(),
                parameters,
                binding: false,
                publish: true,
                annotations: Annotations::default(),
            })
            .await;
    }

    pub async fn seed_binding(&self, namespace: &str, name: &str) {
        self.entities
            .put_package(Package {
                namespace: namespace.to_string(),
                name: name.to_string(),
                parameters: Parameters::new(),
                binding: true,
                publish: false,
                annotations: Annotations::default(),
            })
            .await;
    }

    /// Seed a web-exported action. `package` of `None` lands in the default
    /// package; extra annotations layer on top of `web-export: true`.
    pub async fn seed_web_action(
        &self,
        namespace: &str,
        package: Option<&str>,
        name: &str,
        parameters: Parameters,
        extra_annotations: &[(&str, Value)],
    ) {
        let mut annotations = Annotations::default();
        annotations.set(WEB_EXPORT_ANNOTATION, json!(true));
        for (annotation, value) in extra_annotations {
            annotations.set(*annotation, value.clone());
        }
        let entity_path = match package {
            Some(package) => format!("{namespace}/{package}"),
            None => namespace.to_string(),
        };
        self.entities
            .put_action(Action {
                namespace: entity_path,
                name: name.to_string(),
                parameters,
                annotations,
            })
            .await;
    }
}

pub async fn read_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}

pub async fn read_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    String::from_utf8(bytes.to_vec()).expect("utf8 body")
}
