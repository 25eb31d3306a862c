use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::net::SocketAddr;
use std::time::Duration;

pub const DEFAULT_MAX_ENTITY_SIZE: usize = 1_048_576;
pub const DEFAULT_MAX_BLOCKING_WAIT_MS: u64 = 60_000;
pub const DEFAULT_BODY_READ_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_API_PREFIX: &str = "/api/v1";

// Gateway configuration sourced from environment variables.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    // HTTP bind address for the web-action API.
    pub bind_addr: SocketAddr,
    // Metrics HTTP bind address.
    pub metrics_bind: SocketAddr,
    // Route prefix in front of /web/..., no trailing slash.
    pub api_prefix: String,
    // Largest accepted request entity, in bytes. Exactly at the limit passes.
    pub max_entity_size: usize,
    // Wait bound for blocking invocations; the only long timer per request.
    pub max_blocking_wait: Duration,
    // Bound on reading the request body off the wire.
    pub body_read_timeout: Duration,
    // When true, an unrecognized extension is a 406 instead of .http.
    pub enforce_extension: bool,
}

#[derive(Debug, Deserialize)]
struct GatewayConfigOverride {
    bind_addr: Option<String>,
    metrics_bind: Option<String>,
    api_prefix: Option<String>,
    max_entity_size: Option<usize>,
    max_blocking_wait_ms: Option<u64>,
    body_read_timeout_ms: Option<u64>,
    enforce_extension: Option<bool>,
}

fn env_parsed<T: std::str::FromStr>(name: &str, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(name) {
        Ok(value) => value.parse().with_context(|| format!("parse {name}")),
        Err(_) => Ok(default),
    }
}

impl GatewayConfig {
    pub fn from_env() -> Result<Self> {
        // Environment variables provide defaults for local development.
        let bind_addr = std::env::var("NIMBUS_GW_BIND")
            .unwrap_or_else(|_| "0.0.0.0:3233".to_string())
            .parse()
            .with_context(|| "parse NIMBUS_GW_BIND")?;
        let metrics_bind = std::env::var("NIMBUS_GW_METRICS_BIND")
            .unwrap_or_else(|_| "0.0.0.0:8080".to_string())
            .parse()
            .with_context(|| "parse NIMBUS_GW_METRICS_BIND")?;
        let api_prefix = std::env::var("NIMBUS_GW_API_PREFIX")
            .unwrap_or_else(|_| DEFAULT_API_PREFIX.to_string());
        let max_entity_size =
            env_parsed("NIMBUS_GW_MAX_ENTITY_SIZE", DEFAULT_MAX_ENTITY_SIZE)?;
        let max_blocking_wait_ms = env_parsed(
            "NIMBUS_GW_MAX_BLOCKING_WAIT_MS",
            DEFAULT_MAX_BLOCKING_WAIT_MS,
        )?;
        let body_read_timeout_ms = env_parsed(
            "NIMBUS_GW_BODY_READ_TIMEOUT_MS",
            DEFAULT_BODY_READ_TIMEOUT_MS,
        )?;
        let enforce_extension = env_parsed("NIMBUS_GW_ENFORCE_EXTENSION", false)?;
        Ok(Self {
            bind_addr,
            metrics_bind,
            api_prefix,
            max_entity_size,
            max_blocking_wait: Duration::from_millis(max_blocking_wait_ms),
            body_read_timeout: Duration::from_millis(body_read_timeout_ms),
            enforce_extension,
        })
    }

    pub fn from_env_or_yaml() -> Result<Self> {
        let mut config = Self::from_env()?;
        if let Ok(path) = std::env::var("NIMBUS_GW_CONFIG") {
            // YAML overrides allow ops-friendly config files.
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("read NIMBUS_GW_CONFIG: {path}"))?;
            let override_cfg: GatewayConfigOverride =
                serde_yaml::from_str(&contents).with_context(|| "parse gateway config yaml")?;
            if let Some(value) = override_cfg.bind_addr {
                config.bind_addr = value.parse().with_context(|| "parse bind_addr")?;
            }
            if let Some(value) = override_cfg.metrics_bind {
                config.metrics_bind = value.parse().with_context(|| "parse metrics_bind")?;
            }
            if let Some(value) = override_cfg.api_prefix {
                config.api_prefix = value;
            }
            if let Some(value) = override_cfg.max_entity_size {
                config.max_entity_size = value;
            }
            if let Some(value) = override_cfg.max_blocking_wait_ms {
                config.max_blocking_wait = Duration::from_millis(value);
            }
            if let Some(value) = override_cfg.body_read_timeout_ms {
                config.body_read_timeout = Duration::from_millis(value);
            }
            if let Some(value) = override_cfg.enforce_extension {
                config.enforce_extension = value;
            }
        }
        Ok(config)
    }
}
