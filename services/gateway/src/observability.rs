//! Gateway telemetry: tracing init, request spans, and Prometheus metrics.
//!
//! # Purpose
//! One-time process setup of the tracing subscriber (with an OTLP export
//! pipeline when a collector is reachable), construction of the per-request
//! span the router uses, and the counters the gateway emits. Request spans
//! are labeled with the media extension the URL selects, so traces and
//! rates group by rendering path rather than by raw URI.
use crate::media;
use axum::http::{HeaderMap, StatusCode};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use opentelemetry::global;
use opentelemetry::propagation::Extractor;
use opentelemetry::trace::TracerProvider;
use opentelemetry::KeyValue;
use opentelemetry_sdk::propagation::TraceContextPropagator;
use opentelemetry_sdk::trace as sdktrace;
use opentelemetry_sdk::Resource;
use std::net::SocketAddr;
use std::sync::OnceLock;
use tracing_opentelemetry::OpenTelemetrySpanExt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Initialize tracing and the metrics recorder for this process.
///
/// Idempotent: tests and the binary may both call it. The OTLP pipeline is
/// optional; without a collector the gateway still logs locally.
pub fn init_telemetry(service_name: &str) -> PrometheusHandle {
    static INIT: OnceLock<()> = OnceLock::new();
    INIT.get_or_init(|| {
        global::set_text_map_propagator(TraceContextPropagator::new());

        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let registry = tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer());
        match otlp_provider(service_name) {
            Some(provider) => {
                let tracer = provider.tracer(service_name.to_string());
                let _ = registry
                    .with(tracing_opentelemetry::layer().with_tracer(tracer))
                    .try_init();
            }
            None => {
                let _ = registry.try_init();
            }
        }
    });

    prometheus_handle()
}

fn otlp_provider(service_name: &str) -> Option<sdktrace::TracerProvider> {
    opentelemetry_otlp::new_pipeline()
        .tracing()
        .with_exporter(opentelemetry_otlp::new_exporter().tonic())
        .with_trace_config(
            sdktrace::Config::default().with_resource(gateway_resource(service_name)),
        )
        .install_batch(opentelemetry_sdk::runtime::Tokio)
        .ok()
}

/// Trace resource identifying this gateway instance.
fn gateway_resource(service_name: &str) -> Resource {
    let mut attrs = vec![
        KeyValue::new("service.name", service_name.to_string()),
        KeyValue::new("nimbus.component", "web-gateway"),
    ];
    if let Ok(value) =
        std::env::var("NIMBUS_SERVICE_INSTANCE_ID").or_else(|_| std::env::var("HOSTNAME"))
    {
        attrs.push(KeyValue::new("service.instance.id", value));
    }
    if let Ok(value) = std::env::var("DEPLOYMENT_ENVIRONMENT") {
        attrs.push(KeyValue::new("deployment.environment", value));
    }
    Resource::new(attrs)
}

/// Build the span for one incoming request.
///
/// Joins the caller's W3C trace context when a `traceparent` header is
/// present, and labels the span with the method and the media extension so
/// per-extension latency can be read straight off the traces.
pub fn request_span<B>(request: &axum::http::Request<B>) -> tracing::Span {
    let span = tracing::info_span!(
        "web.request",
        method = %request.method(),
        path = %request.uri().path(),
        extension = extension_of(request.uri().path()),
    );
    span.set_parent(remote_context(request.headers()));
    span
}

/// Media-extension label for a request path.
///
/// The action segment is the first path segment carrying a recognized
/// extension; everything after it is projection. Non-web routes and
/// extensionless requests label as `-`.
pub fn extension_of(path: &str) -> &'static str {
    path.split('/')
        .find_map(media::split_extension)
        .map(|(_, extension)| extension.suffix())
        .unwrap_or("-")
}

fn remote_context(headers: &HeaderMap) -> opentelemetry::Context {
    // Callers (tests included) may hit this before init_telemetry runs.
    static PROPAGATOR: OnceLock<()> = OnceLock::new();
    PROPAGATOR.get_or_init(|| global::set_text_map_propagator(TraceContextPropagator::new()));
    global::get_text_map_propagator(|propagator| propagator.extract(&HeaderCarrier(headers)))
}

struct HeaderCarrier<'a>(&'a HeaderMap);

impl Extractor for HeaderCarrier<'_> {
    fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key)?.to_str().ok()
    }

    fn keys(&self) -> Vec<&str> {
        self.0.keys().map(|name| name.as_str()).collect()
    }
}

/// Serve the Prometheus scrape endpoint on its own listener.
pub async fn serve_prometheus(handle: PrometheusHandle, addr: SocketAddr) -> std::io::Result<()> {
    let app = axum::Router::new().route(
        "/metrics",
        axum::routing::get(move || async move { handle.render() }),
    );
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "metrics listener ready");
    axum::serve(listener, app.into_make_service()).await
}

fn prometheus_handle() -> PrometheusHandle {
    if let Some(handle) = METRICS_HANDLE.get() {
        return handle.clone();
    }
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .expect("install metrics recorder");
    let _ = METRICS_HANDLE.set(handle.clone());
    handle
}

/// Count one completed web request, labeled by status and extension.
pub fn record_web_request(status: StatusCode, extension: &'static str) {
    metrics::counter!(
        "nimbus_gateway_requests_total",
        "code" => status.as_u16().to_string(),
        "extension" => extension
    )
    .increment(1);
}

/// Count one blocking invocation that hit the wait bound.
pub fn record_invoke_timeout() {
    metrics::counter!("nimbus_gateway_invoke_timeouts_total").increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use opentelemetry::trace::{TraceContextExt, TraceId};

    #[test]
    fn extension_labels_come_from_the_action_segment() {
        assert_eq!(extension_of("/api/v1/web/ns/default/hello.json"), ".json");
        // Projection segments after the action do not change the label.
        assert_eq!(
            extension_of("/api/v1/web/ns/default/hello.text/msg"),
            ".text"
        );
        assert_eq!(extension_of("/api/v1/web/ns/default/hello"), "-");
        assert_eq!(extension_of("/v1/system/health"), "-");
    }

    #[test]
    fn remote_context_joins_the_callers_trace() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "traceparent",
            "00-1af7651916cd43dd8448eb211c80319c-b7ad6b7169203331-01"
                .parse()
                .unwrap(),
        );
        let context = remote_context(&headers);
        let binding = context.span();
        let span_context = binding.span_context();
        assert!(span_context.is_valid());
        assert_eq!(
            span_context.trace_id(),
            TraceId::from_hex("1af7651916cd43dd8448eb211c80319c").unwrap()
        );
    }

    #[test]
    fn absent_traceparent_yields_no_remote_parent() {
        let context = remote_context(&HeaderMap::new());
        let binding = context.span();
        assert!(!binding.span_context().is_valid());
    }

    #[test]
    fn request_counters_do_not_panic_without_a_recorder() {
        record_web_request(StatusCode::OK, ".json");
        record_invoke_timeout();
    }
}
