//! 命令处理
//!
//! 每个命令的处理流程：鉴权 -> 取对局锁 -> 读最新快照 -> 校验并执行
//! -> 写回 -> 按广播规则通知。对同一对局的命令被对局锁串行化，
//! 先到者生效，后到者基于新快照重新校验。

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::info;

use protocol::{
    ChessError, ClientCommand, EndReason, GameId, GameStatus, Move, ProtocolError, Result,
    ServerMessage, SessionToken,
};

use crate::server::ServerContext;

/// 会话命令处理器
#[derive(Clone)]
pub struct SessionHandler {
    ctx: Arc<ServerContext>,
}

impl SessionHandler {
    pub fn new(ctx: Arc<ServerContext>) -> Self {
        Self { ctx }
    }

    /// 处理一条客户端命令
    ///
    /// 处理失败只给发起命令的连接回 ERROR，绝不广播。
    pub async fn handle(
        &self,
        cmd: ClientCommand,
        conn_tx: &mpsc::Sender<ServerMessage>,
        session: &mut Option<SessionToken>,
    ) {
        let result = match cmd {
            ClientCommand::Connect {
                auth_token,
                game_id,
            } => {
                self.handle_connect(&auth_token, game_id, conn_tx, session)
                    .await
            }
            ClientCommand::MakeMove {
                auth_token,
                game_id,
                mv,
            } => self.handle_make_move(&auth_token, game_id, mv).await,
            ClientCommand::Leave {
                auth_token,
                game_id,
            } => self.handle_leave(&auth_token, game_id, session).await,
            ClientCommand::Resign {
                auth_token,
                game_id,
            } => self.handle_resign(&auth_token, game_id).await,
        };

        if let Err(e) = result {
            let _ = conn_tx
                .send(ServerMessage::Error {
                    error_message: e.to_string(),
                })
                .await;
        }
    }

    /// 加入对局（玩家或旁观者）
    async fn handle_connect(
        &self,
        token: &str,
        game_id: GameId,
        conn_tx: &mpsc::Sender<ServerMessage>,
        session: &mut Option<SessionToken>,
    ) -> Result<()> {
        let identity = self.ctx.auth.resolve_identity(token).await?;
        let data = self.ctx.store.fetch(game_id).await?;

        self.ctx
            .registry
            .register(token, game_id, conn_tx.clone())
            .await;
        *session = Some(token.to_string());

        let role = match data.seat_of(&identity.username) {
            Some(color) => color.to_string(),
            None => "旁观者".to_string(),
        };
        info!(
            "{} 以{}身份加入对局 {}",
            identity.username, role, game_id
        );

        // 完整对局状态只发给加入者，其他人收到加入通知
        let _ = conn_tx.send(ServerMessage::LoadGame { game: data }).await;
        self.ctx
            .registry
            .broadcast(
                game_id,
                ServerMessage::Notification {
                    message: format!("{} 以{}身份加入对局", identity.username, role),
                },
                Some(token),
            )
            .await;

        Ok(())
    }

    /// 走棋
    async fn handle_make_move(&self, token: &str, game_id: GameId, mv: Move) -> Result<()> {
        let identity = self.ctx.auth.resolve_identity(token).await?;

        let lock = self.ctx.game_lock(game_id).await;
        let _guard = lock.lock().await;

        let mut data = self.ctx.store.fetch(game_id).await?;
        let seat = data
            .seat_of(&identity.username)
            .ok_or(ProtocolError::SpectatorForbidden)?;

        // 席位校验：不能替对方走子
        if !data.game.is_over() && data.game.turn != seat {
            return Err(ChessError::NotYourTurn.into());
        }

        data.game.make_move(mv)?;
        let status = data.game.status;
        // 广播用写回的同一份快照，走子一旦落库就不再依赖回读
        let snapshot = data.clone();
        self.ctx.store.store(data).await?;

        info!("{}（{}）走子 {} -> {}", identity.username, seat, mv.start, mv.end);

        // 新对局状态广播给所有人，走子通知只发给其他人
        self.ctx
            .registry
            .broadcast(game_id, ServerMessage::LoadGame { game: snapshot }, None)
            .await;
        self.ctx
            .registry
            .broadcast(
                game_id,
                ServerMessage::Notification {
                    message: format!(
                        "{}（{}）走子 {} -> {}",
                        identity.username, seat, mv.start, mv.end
                    ),
                },
                Some(token),
            )
            .await;

        // 终局通知发给所有人
        if let GameStatus::Ended(reason) = status {
            let message = match reason {
                EndReason::Checkmate(loser) => {
                    format!("{}被将死，{}获胜", loser, loser.opponent())
                }
                EndReason::Stalemate => "逼和，对局以和棋结束".to_string(),
                EndReason::Resignation(resigner) => format!("{}认输", resigner),
            };
            self.ctx
                .registry
                .broadcast(game_id, ServerMessage::Notification { message }, None)
                .await;
            self.ctx.release_game_lock(game_id).await;
        }

        Ok(())
    }

    /// 离开对局
    async fn handle_leave(
        &self,
        token: &str,
        game_id: GameId,
        session: &mut Option<SessionToken>,
    ) -> Result<()> {
        let identity = self.ctx.auth.resolve_identity(token).await?;

        // 腾空席位由存储原子完成，对局本身保留；旁观者无席位可腾
        self.ctx
            .store
            .vacate_seat(game_id, &identity.username)
            .await?;

        self.ctx.registry.remove(token).await;
        if session.as_deref() == Some(token) {
            *session = None;
        }

        info!("{} 离开对局 {}", identity.username, game_id);
        self.ctx
            .registry
            .broadcast(
                game_id,
                ServerMessage::Notification {
                    message: format!("{} 离开了对局", identity.username),
                },
                Some(token),
            )
            .await;

        Ok(())
    }

    /// 认输
    async fn handle_resign(&self, token: &str, game_id: GameId) -> Result<()> {
        let identity = self.ctx.auth.resolve_identity(token).await?;

        let lock = self.ctx.game_lock(game_id).await;
        let _guard = lock.lock().await;

        let mut data = self.ctx.store.fetch(game_id).await?;
        let seat = data
            .seat_of(&identity.username)
            .ok_or(ProtocolError::SpectatorForbidden)?;

        data.game.resign(seat)?;
        self.ctx.store.store(data).await?;

        info!("{}（{}）认输，对局 {} 结束", identity.username, seat, game_id);

        // 认输通知发给所有人，包括认输者自己
        self.ctx
            .registry
            .broadcast(
                game_id,
                ServerMessage::Notification {
                    message: format!("{}（{}）认输，{}获胜", identity.username, seat, seat.opponent()),
                },
                None,
            )
            .await;
        self.ctx.release_game_lock(game_id).await;

        Ok(())
    }
}
