// Nimbus Web Action Gateway (HTTP)
// --------------------------------
// This binary is the web front-end of the Nimbus serverless control plane.
// It turns a request for a fully-qualified action name into a blocking
// invocation: resolves the owner identity and the action record, enforces
// export/auth annotations and the owner's activation quota, merges
// parameters across the package/action/query/body layers under the
// immutability rules, invokes with a bounded wait, and projects the JSON
// result into the media representation the URL extension asked for
// (.http/.json/.html/.svg/.text).
//
// Collaborator model:
// - The auth store, entity store, entitlement provider, and invoker are
//   external services behind async traits. This binary wires the in-memory
//   implementations, which makes it a self-contained development gateway;
//   production deployments substitute the shared backends.
// - Each gateway instance is stateless: nothing but the collaborators'
//   process-wide clients crosses requests.
use anyhow::Result;
use gateway::app::{build_router, AppState};
use gateway::config::GatewayConfig;
use gateway::model::{Action, Annotations, AuthKey, Identity, Limits, Package, Parameters};
use gateway::model::{ActivationResponse, RAW_HTTP_ANNOTATION, WEB_EXPORT_ANNOTATION};
use gateway::store::memory::{
    FunctionRegistry, InMemoryAuthStore, InMemoryEntityStore, LocalEntitlement,
};
use gateway::store::EntityStore;
use gateway::observability;
use serde_json::json;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    let metrics_handle = observability::init_telemetry("nimbus-gateway");

    let config = GatewayConfig::from_env_or_yaml().expect("gateway config");

    let auth = Arc::new(InMemoryAuthStore::new());
    let entities = Arc::new(InMemoryEntityStore::new());
    let entitlement = Arc::new(LocalEntitlement::new(None));
    let invoker = Arc::new(FunctionRegistry::new());
    seed_dev_fixtures(&auth, &entities, &invoker).await;

    tracing::info!(
        backend = entities.backend_name(),
        "gateway collaborators ready (development mode)"
    );

    tokio::spawn(observability::serve_prometheus(
        metrics_handle,
        config.metrics_bind,
    ));

    let addr = config.bind_addr;
    let state = AppState {
        config: Arc::new(config),
        auth,
        entities,
        entitlement,
        invoker,
    };
    let app = build_router(state);

    tracing::info!(%addr, "web action gateway listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}

// A guest namespace with a couple of web actions, so the development
// binary answers requests out of the box:
//   GET /api/v1/web/guest/default/hello.json
//   ANY /api/v1/web/guest/demo/echo.http
async fn seed_dev_fixtures(
    auth: &InMemoryAuthStore,
    entities: &InMemoryEntityStore,
    invoker: &FunctionRegistry,
) {
    auth.put_identity(Identity {
        subject: "guest".to_string(),
        namespace: "guest".to_string(),
        auth_key: AuthKey {
            uuid: uuid::Uuid::new_v4().to_string(),
            secret: uuid::Uuid::new_v4().simple().to_string(),
        },
        limits: Limits::default(),
    })
    .await;

    let mut web = Annotations::default();
    web.set(WEB_EXPORT_ANNOTATION, json!(true));

    entities
        .put_action(Action {
            namespace: "guest".to_string(),
            name: "hello".to_string(),
            parameters: Parameters::new(),
            annotations: web.clone(),
        })
        .await;
    invoker
        .register("guest/hello", |payload| {
            let name = payload
                .get("name")
                .and_then(|value| value.as_str())
                .unwrap_or("world");
            ActivationResponse::success(json!({ "msg": format!("hello, {name}") }))
        })
        .await;

    entities
        .put_package(Package {
            namespace: "guest".to_string(),
            name: "demo".to_string(),
            parameters: Parameters::new(),
            binding: false,
            publish: true,
            annotations: Annotations::default(),
        })
        .await;
    let mut raw = web;
    raw.set(RAW_HTTP_ANNOTATION, json!(true));
    entities
        .put_action(Action {
            namespace: "guest/demo".to_string(),
            name: "echo".to_string(),
            parameters: Parameters::new(),
            annotations: raw,
        })
        .await;
    invoker
        .register("guest/demo/echo", |payload| {
            ActivationResponse::success(json!({
                "statusCode": 200,
                "headers": { "content-type": "application/json" },
                "body": payload.to_string(),
            }))
        })
        .await;
}
