//! 对局存储
//!
//! 命令处理流程只依赖 `GameStore` trait：读取快照、写回整份对局数据。
//! 内存实现另外提供建局和占座接口，供启动引导和测试使用。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use protocol::{Color, GameData, GameId, ProtocolError, Result};

/// 对局存储
#[async_trait]
pub trait GameStore: Send + Sync {
    /// 读取对局快照，不存在返回 `GameNotFound`
    async fn fetch(&self, game_id: GameId) -> Result<GameData>;

    /// 写回整份对局数据
    async fn store(&self, data: GameData) -> Result<()>;

    /// 腾空指定用户占据的席位（原子操作，旁观者无席位时是空操作）
    async fn vacate_seat(&self, game_id: GameId, username: &str) -> Result<()>;
}

/// 内存对局存储
pub struct MemoryGameStore {
    games: RwLock<HashMap<GameId, GameData>>,
    next_id: RwLock<GameId>,
}

impl MemoryGameStore {
    pub fn new() -> Self {
        Self {
            games: RwLock::new(HashMap::new()),
            next_id: RwLock::new(1),
        }
    }

    /// 创建新对局，返回分配的对局 ID
    pub async fn create(&self, game_name: &str) -> GameId {
        let mut next_id = self.next_id.write().await;
        let game_id = *next_id;
        *next_id += 1;

        let mut games = self.games.write().await;
        games.insert(game_id, GameData::new(game_id, game_name));
        game_id
    }

    /// 占据席位，已被他人占据时返回错误
    pub async fn claim_seat(&self, game_id: GameId, color: Color, username: &str) -> Result<()> {
        let mut games = self.games.write().await;
        let data = games
            .get_mut(&game_id)
            .ok_or(ProtocolError::GameNotFound { game_id })?;

        let seat = match color {
            Color::White => &mut data.white_username,
            Color::Black => &mut data.black_username,
        };
        match seat {
            Some(occupant) if occupant != username => Err(ProtocolError::MalformedCommand {
                reason: format!("seat {:?} already taken", color),
            }),
            _ => {
                *seat = Some(username.to_string());
                Ok(())
            }
        }
    }
}

impl Default for MemoryGameStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GameStore for MemoryGameStore {
    async fn fetch(&self, game_id: GameId) -> Result<GameData> {
        let games = self.games.read().await;
        games
            .get(&game_id)
            .cloned()
            .ok_or(ProtocolError::GameNotFound { game_id })
    }

    async fn store(&self, data: GameData) -> Result<()> {
        let mut games = self.games.write().await;
        games.insert(data.game_id, data);
        Ok(())
    }

    async fn vacate_seat(&self, game_id: GameId, username: &str) -> Result<()> {
        let mut games = self.games.write().await;
        let data = games
            .get_mut(&game_id)
            .ok_or(ProtocolError::GameNotFound { game_id })?;
        data.vacate(username);
        Ok(())
    }
}
