//! Static bearer-token identity
//!
//! Stand-in for the external identity provider: a fixed table of API
//! tokens, each mapped to the user it authenticates.

use std::collections::HashMap;

use async_trait::async_trait;

use dialer::{UserId, UserResolver};

pub struct StaticTokenResolver {
    tokens: HashMap<String, UserId>,
}

impl StaticTokenResolver {
    pub fn new(api_keys: impl IntoIterator<Item = (String, UserId)>) -> Self {
        Self {
            tokens: api_keys.into_iter().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

#[async_trait]
impl UserResolver for StaticTokenResolver {
    async fn resolve_user(&self, credential: &str) -> Option<UserId> {
        self.tokens.get(credential).cloned()
    }
}
