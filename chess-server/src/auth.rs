//! 会话鉴权
//!
//! 令牌的签发在对局服务之外完成，这里只负责把令牌解析成身份。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use protocol::{ProtocolError, Result, SessionToken};

/// 已鉴权的用户身份
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub username: String,
}

/// 鉴权服务
#[async_trait]
pub trait AuthService: Send + Sync {
    /// 解析令牌对应的身份，无效令牌返回 `Unauthorized`
    async fn resolve_identity(&self, token: &str) -> Result<Identity>;
}

/// 内存鉴权服务（单机部署和测试使用）
pub struct MemoryAuthService {
    tokens: RwLock<HashMap<SessionToken, String>>,
}

impl MemoryAuthService {
    pub fn new() -> Self {
        Self {
            tokens: RwLock::new(HashMap::new()),
        }
    }

    /// 登记令牌与用户名的对应关系
    pub async fn issue(&self, token: &str, username: &str) {
        let mut tokens = self.tokens.write().await;
        tokens.insert(token.to_string(), username.to_string());
    }

    /// 吊销令牌
    pub async fn revoke(&self, token: &str) {
        let mut tokens = self.tokens.write().await;
        tokens.remove(token);
    }
}

impl Default for MemoryAuthService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuthService for MemoryAuthService {
    async fn resolve_identity(&self, token: &str) -> Result<Identity> {
        let tokens = self.tokens.read().await;
        tokens
            .get(token)
            .map(|username| Identity {
                username: username.clone(),
            })
            .ok_or(ProtocolError::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_resolve_identity() {
        let auth = MemoryAuthService::new();
        auth.issue("token-1", "alice").await;

        let identity = auth.resolve_identity("token-1").await.unwrap();
        assert_eq!(identity.username, "alice");
    }

    #[tokio::test]
    async fn test_unknown_token_rejected() {
        let auth = MemoryAuthService::new();

        let result = auth.resolve_identity("bogus").await;
        assert!(matches!(result, Err(ProtocolError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_revoked_token_rejected() {
        let auth = MemoryAuthService::new();
        auth.issue("token-1", "alice").await;
        auth.revoke("token-1").await;

        let result = auth.resolve_identity("token-1").await;
        assert!(matches!(result, Err(ProtocolError::Unauthorized)));
    }
}
