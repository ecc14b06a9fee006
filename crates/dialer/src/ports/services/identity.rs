//! Identity Port
//!
//! Authentication is delegated to an external identity provider. The core
//! only needs to turn a request credential into an opaque user id.

use async_trait::async_trait;

use crate::domain::value_objects::UserId;

#[async_trait]
pub trait UserResolver: Send + Sync {
    /// Resolve a bearer credential; `None` means unauthenticated
    async fn resolve_user(&self, credential: &str) -> Option<UserId>;
}
