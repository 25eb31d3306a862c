//! Caller authentication and owner identity lookup.
//!
//! # Purpose
//! The web route serves anonymous and authenticated callers on the same
//! paths. Credentials, when present, are `Authorization: Basic` with the
//! auth-key uuid and secret; the owner of the addressed namespace is looked
//! up regardless of who calls.
use crate::api::error::Reject;
use crate::model::Identity;
use crate::store::{AuthStore, StoreError};
use axum::http::HeaderMap;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

/// Resolve the owner identity of a namespace.
///
/// Store failures that could reveal namespace existence collapse to 404.
pub async fn owner_identity(auth: &dyn AuthStore, namespace: &str) -> Result<Identity, Reject> {
    auth.identity_by_namespace(namespace)
        .await
        .map_err(|err| match err {
            StoreError::NotFound(_) | StoreError::Malformed(_) => {
                Reject::not_found("resource not found")
            }
            StoreError::Unexpected(err) => {
                tracing::error!(error = ?err, "auth store failure");
                Reject::internal("internal error")
            }
        })
}

/// Validate the caller's credentials, when any were presented.
///
/// No Authorization header means an anonymous caller. A header that is
/// present but unusable (wrong scheme, bad encoding, unknown key) is a 401;
/// it is never silently downgraded to anonymous.
pub async fn authenticate_caller(
    auth: &dyn AuthStore,
    headers: &HeaderMap,
) -> Result<Option<Identity>, Reject> {
    let Some(value) = headers.get(axum::http::header::AUTHORIZATION) else {
        return Ok(None);
    };
    let (uuid, secret) = value
        .to_str()
        .ok()
        .and_then(parse_basic)
        .ok_or_else(|| Reject::unauthorized("authentication failed"))?;

    match auth.identity_by_auth_key(&uuid, &secret).await {
        Ok(identity) => Ok(Some(identity)),
        Err(StoreError::NotFound(_)) | Err(StoreError::Malformed(_)) => {
            Err(Reject::unauthorized("authentication failed"))
        }
        Err(StoreError::Unexpected(err)) => {
            tracing::error!(error = ?err, "auth store failure");
            Err(Reject::internal("internal error"))
        }
    }
}

/// We only accept the standard `Basic <base64(uuid:secret)>` form.
fn parse_basic(value: &str) -> Option<(String, String)> {
    let encoded = value.strip_prefix("Basic ")?;
    let decoded = BASE64.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (uuid, secret) = decoded.split_once(':')?;
    Some((uuid.to_string(), secret.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AuthKey, Limits};
    use crate::store::memory::InMemoryAuthStore;
    use axum::http::StatusCode;

    fn owner() -> Identity {
        Identity {
            subject: "subject".to_string(),
            namespace: "ns".to_string(),
            auth_key: AuthKey {
                uuid: "key-uuid".to_string(),
                secret: "key-secret".to_string(),
            },
            limits: Limits::default(),
        }
    }

    fn basic_header(uuid: &str, secret: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        let encoded = BASE64.encode(format!("{uuid}:{secret}"));
        headers.insert(
            axum::http::header::AUTHORIZATION,
            format!("Basic {encoded}").parse().unwrap(),
        );
        headers
    }

    #[tokio::test]
    async fn missing_namespace_collapses_to_404() {
        let store = InMemoryAuthStore::new();
        let err = owner_identity(&store, "ghost").await.unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn anonymous_when_no_header() {
        let store = InMemoryAuthStore::new();
        let caller = authenticate_caller(&store, &HeaderMap::new()).await.unwrap();
        assert!(caller.is_none());
    }

    #[tokio::test]
    async fn valid_basic_credentials_resolve_the_caller() {
        let store = InMemoryAuthStore::new();
        store.put_identity(owner()).await;
        let caller = authenticate_caller(&store, &basic_header("key-uuid", "key-secret"))
            .await
            .unwrap();
        assert_eq!(caller.unwrap().namespace, "ns");
    }

    #[tokio::test]
    async fn bad_credentials_are_401_not_anonymous() {
        let store = InMemoryAuthStore::new();
        store.put_identity(owner()).await;

        let err = authenticate_caller(&store, &basic_header("key-uuid", "wrong"))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);

        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::AUTHORIZATION,
            "Bearer some-token".parse().unwrap(),
        );
        let err = authenticate_caller(&store, &headers).await.unwrap_err();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);

        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::AUTHORIZATION,
            "Basic not!base64".parse().unwrap(),
        );
        let err = authenticate_caller(&store, &headers).await.unwrap_err();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
    }
}
