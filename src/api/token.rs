//! Credential supply for the HTTP client.
//!
//! Token acquisition, the OAuth consent flow, and token persistence all live
//! outside this crate. The client only needs a current bearer token and a way
//! to demand a fresh one after the provider rejects it, so that dependency is
//! made explicit here instead of reaching into any shared session state.

use crate::Result;

/// Supplies the bearer token used to authenticate remote calls.
#[async_trait::async_trait]
pub trait TokenProvider: Send {
    /// Returns the current access token.
    async fn access_token(&mut self) -> Result<String>;

    /// Invalidates the current token and returns a replacement. Called after
    /// a `401 Unauthorized` response; failing here fails the remote call.
    async fn refresh(&mut self) -> Result<String>;
}

/// A fixed token that cannot be refreshed. Suitable for short-lived sessions
/// where the caller already holds a fresh credential.
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

#[async_trait::async_trait]
impl TokenProvider for StaticToken {
    async fn access_token(&mut self) -> Result<String> {
        Ok(self.0.clone())
    }

    async fn refresh(&mut self) -> Result<String> {
        anyhow::bail!("the access token was rejected and no refresh is available")
    }
}
