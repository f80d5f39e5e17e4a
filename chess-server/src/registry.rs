//! 连接注册表
//!
//! 以会话令牌为键，记录每个在线连接订阅的对局和出站通道。
//! 广播时按对局过滤，出站队列已关闭的连接会被清理出注册表。

use std::collections::HashMap;

use tokio::sync::{mpsc, RwLock};
use tracing::{debug, warn};

use protocol::{GameId, ServerMessage, SessionToken};

/// 每个连接出站队列的容量
pub const OUTBOUND_QUEUE_SIZE: usize = 64;

/// 注册表中的一条连接记录
#[derive(Debug, Clone)]
struct ConnectionEntry {
    /// 该连接订阅的对局
    game_id: GameId,
    /// 出站消息通道（由连接的写任务消费）
    tx: mpsc::Sender<ServerMessage>,
}

/// 连接注册表
pub struct ConnectionRegistry {
    connections: RwLock<HashMap<SessionToken, ConnectionEntry>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
        }
    }

    /// 登记连接
    ///
    /// 同一令牌重复登记时，新通道替换旧通道（重连场景）。
    pub async fn register(
        &self,
        token: &str,
        game_id: GameId,
        tx: mpsc::Sender<ServerMessage>,
    ) {
        let mut connections = self.connections.write().await;
        connections.insert(token.to_string(), ConnectionEntry { game_id, tx });
        debug!("连接登记: token={} game_id={}", token, game_id);
    }

    /// 注销连接
    pub async fn remove(&self, token: &str) {
        let mut connections = self.connections.write().await;
        if connections.remove(token).is_some() {
            debug!("连接注销: token={}", token);
        }
    }

    /// 连接是否在线
    pub async fn contains(&self, token: &str) -> bool {
        self.connections.read().await.contains_key(token)
    }

    /// 发送消息给单个连接
    pub async fn send_to(&self, token: &str, msg: ServerMessage) {
        let connections = self.connections.read().await;
        if let Some(entry) = connections.get(token) {
            if let Err(e) = entry.tx.try_send(msg) {
                warn!("消息发送失败: token={} err={}", token, e);
            }
        }
    }

    /// 广播消息给对局内的所有连接
    ///
    /// `exclude` 指定不接收本条消息的令牌（通常是事件的发起者）。
    /// 发送是尽力而为：队列满则丢弃该连接的本条消息，
    /// 队列已关闭的连接在广播后清理出注册表。
    pub async fn broadcast(&self, game_id: GameId, msg: ServerMessage, exclude: Option<&str>) {
        let mut dead = Vec::new();

        {
            let connections = self.connections.read().await;
            for (token, entry) in connections.iter() {
                if entry.game_id != game_id {
                    continue;
                }
                if exclude == Some(token.as_str()) {
                    continue;
                }
                match entry.tx.try_send(msg.clone()) {
                    Ok(()) => {}
                    Err(mpsc::error::TrySendError::Full(_)) => {
                        warn!("出站队列已满，丢弃消息: token={}", token);
                    }
                    Err(mpsc::error::TrySendError::Closed(_)) => {
                        dead.push(token.clone());
                    }
                }
            }
        }

        if !dead.is_empty() {
            let mut connections = self.connections.write().await;
            for token in dead {
                connections.remove(&token);
                debug!("清理已断开的连接: token={}", token);
            }
        }
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(text: &str) -> ServerMessage {
        ServerMessage::Notification {
            message: text.to_string(),
        }
    }

    #[tokio::test]
    async fn test_send_to() {
        let registry = ConnectionRegistry::new();
        let (tx, mut rx) = mpsc::channel(OUTBOUND_QUEUE_SIZE);
        registry.register("token-1", 1, tx).await;

        registry.send_to("token-1", note("hello")).await;
        assert_eq!(rx.recv().await, Some(note("hello")));

        // 不存在的令牌静默忽略
        registry.send_to("token-2", note("nobody")).await;
    }

    #[tokio::test]
    async fn test_broadcast_filters_by_game() {
        let registry = ConnectionRegistry::new();
        let (tx1, mut rx1) = mpsc::channel(OUTBOUND_QUEUE_SIZE);
        let (tx2, mut rx2) = mpsc::channel(OUTBOUND_QUEUE_SIZE);
        let (tx3, mut rx3) = mpsc::channel(OUTBOUND_QUEUE_SIZE);
        registry.register("a", 1, tx1).await;
        registry.register("b", 1, tx2).await;
        registry.register("c", 2, tx3).await;

        registry.broadcast(1, note("对局1"), None).await;

        assert_eq!(rx1.try_recv().ok(), Some(note("对局1")));
        assert_eq!(rx2.try_recv().ok(), Some(note("对局1")));
        assert!(rx3.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_broadcast_excludes_sender() {
        let registry = ConnectionRegistry::new();
        let (tx1, mut rx1) = mpsc::channel(OUTBOUND_QUEUE_SIZE);
        let (tx2, mut rx2) = mpsc::channel(OUTBOUND_QUEUE_SIZE);
        registry.register("a", 1, tx1).await;
        registry.register("b", 1, tx2).await;

        registry.broadcast(1, note("事件"), Some("a")).await;

        assert!(rx1.try_recv().is_err());
        assert_eq!(rx2.try_recv().ok(), Some(note("事件")));
    }

    #[tokio::test]
    async fn test_broadcast_prunes_closed_connections() {
        let registry = ConnectionRegistry::new();
        let (tx1, rx1) = mpsc::channel(OUTBOUND_QUEUE_SIZE);
        let (tx2, mut rx2) = mpsc::channel(OUTBOUND_QUEUE_SIZE);
        registry.register("a", 1, tx1).await;
        registry.register("b", 1, tx2).await;

        // 接收端掉线
        drop(rx1);

        registry.broadcast(1, note("事件"), None).await;

        assert!(!registry.contains("a").await);
        assert!(registry.contains("b").await);
        assert_eq!(rx2.try_recv().ok(), Some(note("事件")));
    }

    #[tokio::test]
    async fn test_reregister_replaces_channel() {
        let registry = ConnectionRegistry::new();
        let (tx1, mut rx1) = mpsc::channel(OUTBOUND_QUEUE_SIZE);
        let (tx2, mut rx2) = mpsc::channel(OUTBOUND_QUEUE_SIZE);
        registry.register("a", 1, tx1).await;
        registry.register("a", 2, tx2).await;

        registry.broadcast(2, note("新对局"), None).await;

        assert!(rx1.try_recv().is_err());
        assert_eq!(rx2.try_recv().ok(), Some(note("新对局")));
    }

    #[tokio::test]
    async fn test_remove() {
        let registry = ConnectionRegistry::new();
        let (tx, mut rx) = mpsc::channel(OUTBOUND_QUEUE_SIZE);
        registry.register("a", 1, tx).await;

        registry.remove("a").await;

        registry.broadcast(1, note("事件"), None).await;
        assert!(rx.try_recv().is_err());
        assert!(!registry.contains("a").await);
    }
}
