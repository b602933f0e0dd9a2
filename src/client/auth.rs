use std::fmt;
use std::sync::Arc;

use reqwest::header::{HeaderValue, AUTHORIZATION};

use super::ClientError;
use crate::models::OutboundRequest;
use crate::storage::CredentialStore;

/// Pre-send step that attaches the stored bearer credential.
///
/// The credential is fetched fresh for every request and never cached, so a
/// logout takes effect on the next call.
pub struct BearerAuth<S: ?Sized> {
    store: Arc<S>,
    key: String,
}

impl<S: ?Sized> Clone for BearerAuth<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            key: self.key.clone(),
        }
    }
}

impl<S: ?Sized> fmt::Debug for BearerAuth<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BearerAuth").field("key", &self.key).finish()
    }
}

impl<S: CredentialStore + ?Sized> BearerAuth<S> {
    pub fn new(store: Arc<S>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Read the credential and, if one is stored, set `Authorization: Bearer <token>`.
    ///
    /// An absent or empty credential leaves the request untouched. A storage
    /// failure is returned as-is and the request is dropped.
    pub async fn intercept(
        &self,
        mut request: OutboundRequest,
    ) -> Result<OutboundRequest, ClientError> {
        let token = self.store.get(&self.key).await?;

        match token.as_deref() {
            Some(token) if !token.is_empty() => {
                let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
                    .map_err(|_| ClientError::InvalidCredential)?;
                value.set_sensitive(true);
                request.headers.insert(AUTHORIZATION, value);
                tracing::debug!(
                    method = %request.method,
                    url = %request.url,
                    "attached bearer credential"
                );
            }
            _ => {
                tracing::debug!(
                    method = %request.method,
                    url = %request.url,
                    "no stored credential, sending anonymously"
                );
            }
        }

        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use reqwest::Method;

    fn auth_with(store: MemoryStore) -> BearerAuth<MemoryStore> {
        BearerAuth::new(Arc::new(store), "token")
    }

    #[tokio::test]
    async fn attaches_bearer_header_when_token_stored() {
        let auth = auth_with(MemoryStore::with_value("token", "abc123"));
        let request = auth
            .intercept(OutboundRequest::new(Method::GET, "/movies/42"))
            .await
            .unwrap();

        assert_eq!(request.header("authorization"), Some("Bearer abc123"));
    }

    #[tokio::test]
    async fn empty_token_is_treated_as_absent() {
        let auth = auth_with(MemoryStore::with_value("token", ""));
        let request = auth
            .intercept(OutboundRequest::new(Method::GET, "/movies/42"))
            .await
            .unwrap();

        assert!(request.headers.get(AUTHORIZATION).is_none());
    }

    #[tokio::test]
    async fn reads_only_the_configured_key() {
        let auth = BearerAuth::new(
            Arc::new(MemoryStore::with_value("token", "abc123")),
            "session",
        );
        let request = auth
            .intercept(OutboundRequest::new(Method::GET, "/movies"))
            .await
            .unwrap();

        assert!(request.headers.get(AUTHORIZATION).is_none());
    }

    #[tokio::test]
    async fn stored_token_replaces_caller_authorization() {
        let auth = auth_with(MemoryStore::with_value("token", "fresh"));
        let mut request = OutboundRequest::new(Method::GET, "/movies");
        request.set_header("Authorization", "Bearer stale").unwrap();

        let request = auth.intercept(request).await.unwrap();
        assert_eq!(request.header("authorization"), Some("Bearer fresh"));
        assert_eq!(request.headers.get_all(AUTHORIZATION).iter().count(), 1);
    }

    #[tokio::test]
    async fn rejects_tokens_that_cannot_be_header_values() {
        let auth = auth_with(MemoryStore::with_value("token", "abc\n123"));
        let err = auth
            .intercept(OutboundRequest::new(Method::GET, "/movies"))
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::InvalidCredential));
    }

    #[test]
    fn debug_output_omits_store_contents() {
        let auth = auth_with(MemoryStore::with_value("token", "abc123"));
        let rendered = format!("{auth:?}");
        assert!(rendered.contains("token"));
        assert!(!rendered.contains("abc123"));
    }
}
