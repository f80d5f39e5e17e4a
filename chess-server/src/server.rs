//! 服务器主体
//!
//! `ServerContext` 显式持有全部共享状态（注册表、鉴权、存储、对局锁），
//! 通过 `Arc` 在连接任务之间传递，不依赖任何全局单例。
//! 每条 TCP 连接拆成一个读循环和一个写任务，写任务消费该连接的
//! 出站队列，读循环逐帧解码命令并交给 `SessionHandler`。

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info, warn};

use protocol::{
    ClientCommand, Connection, GameId, Listener, ProtocolError, Result, ServerMessage,
    SessionToken, TcpConnection, TcpListener,
};

use crate::auth::AuthService;
use crate::handler::SessionHandler;
use crate::registry::{ConnectionRegistry, OUTBOUND_QUEUE_SIZE};
use crate::store::GameStore;

/// 服务器共享上下文
pub struct ServerContext {
    pub registry: Arc<ConnectionRegistry>,
    pub auth: Arc<dyn AuthService>,
    pub store: Arc<dyn GameStore>,
    /// 对局 ID -> 串行化锁，同一对局的命令依次执行。
    /// 条目在对局终结时移除，锁表只随进行中的对局增长。
    game_locks: Mutex<HashMap<GameId, Arc<Mutex<()>>>>,
}

impl ServerContext {
    pub fn new(auth: Arc<dyn AuthService>, store: Arc<dyn GameStore>) -> Self {
        Self {
            registry: Arc::new(ConnectionRegistry::new()),
            auth,
            store,
            game_locks: Mutex::new(HashMap::new()),
        }
    }

    /// 获取对局的串行化锁，首次访问时创建
    pub async fn game_lock(&self, game_id: GameId) -> Arc<Mutex<()>> {
        let mut locks = self.game_locks.lock().await;
        locks
            .entry(game_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// 移除对局的串行化锁（对局终结后调用）
    ///
    /// 仍持有旧 `Arc` 的在途命令不受影响，它们面对的是已终结的
    /// 对局，只会得到 AlreadyEnded。
    pub async fn release_game_lock(&self, game_id: GameId) {
        let mut locks = self.game_locks.lock().await;
        locks.remove(&game_id);
    }

    #[cfg(test)]
    pub(crate) async fn game_lock_count(&self) -> usize {
        self.game_locks.lock().await.len()
    }
}

/// 对局服务器
pub struct ChessServer {
    ctx: Arc<ServerContext>,
    listener: TcpListener,
}

impl ChessServer {
    /// 绑定监听地址
    pub async fn bind(ctx: Arc<ServerContext>, addr: &str) -> Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self { ctx, listener })
    }

    /// 实际监听的地址
    pub fn local_addr(&self) -> Option<String> {
        self.listener.local_addr()
    }

    /// 接受连接并为每条连接派生处理任务
    pub async fn serve(mut self) -> Result<()> {
        if let Some(addr) = self.local_addr() {
            info!("对局服务器监听 {}", addr);
        }

        loop {
            match self.listener.accept().await {
                Ok(conn) => {
                    let ctx = self.ctx.clone();
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(ctx, conn).await {
                            warn!("连接处理出错: {}", e);
                        }
                    });
                }
                Err(e) => {
                    warn!("接受连接失败: {}", e);
                }
            }
        }
    }
}

/// 单条连接的生命周期
///
/// 读循环退出（断开或出错）后注销该连接登记的会话，
/// 再关闭出站队列让写任务自然结束。
async fn handle_connection(ctx: Arc<ServerContext>, conn: TcpConnection) -> Result<()> {
    let peer = conn.peer_addr().unwrap_or_else(|| "unknown".to_string());
    debug!("新连接: {}", peer);

    let (mut reader, mut writer) = conn.split();
    let (tx, mut rx) = mpsc::channel::<ServerMessage>(OUTBOUND_QUEUE_SIZE);

    // 写任务：把出站队列里的消息逐帧发出
    let write_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if writer.write_frame(&msg).await.is_err() {
                break;
            }
        }
    });

    let handler = SessionHandler::new(ctx.clone());
    let mut session: Option<SessionToken> = None;

    let result = loop {
        let raw = match reader.read_raw_frame().await {
            Ok(raw) => raw,
            Err(e) => break e,
        };

        // 解不开的命令只回 ERROR，不断开连接
        let cmd: ClientCommand = match serde_json::from_slice(raw) {
            Ok(cmd) => cmd,
            Err(e) => {
                let err = ProtocolError::MalformedCommand {
                    reason: e.to_string(),
                };
                let _ = tx
                    .send(ServerMessage::Error {
                        error_message: err.to_string(),
                    })
                    .await;
                continue;
            }
        };

        handler.handle(cmd, &tx, &mut session).await;
    };

    // 注销该连接登记的会话
    if let Some(token) = session {
        ctx.registry.remove(&token).await;
    }

    drop(tx);
    let _ = write_task.await;

    match result {
        ProtocolError::ConnectionClosed => {
            debug!("客户端断开: {}", peer);
            Ok(())
        }
        e => Err(e),
    }
}
