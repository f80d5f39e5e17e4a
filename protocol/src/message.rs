//! 消息类型定义
//!
//! 线上格式为 JSON 标签联合：客户端命令以 `commandType` 区分，
//! 服务端消息以 `serverMessageType` 区分。字段名遵循线上约定
//! （`authToken`、`gameID`、`move`），Rust 侧通过 serde 重命名映射。

use serde::{Deserialize, Serialize};

use crate::game::Game;
use crate::moves::Move;
use crate::piece::Color;

/// 对局 ID
pub type GameId = u32;

/// 会话令牌
pub type SessionToken = String;

/// 客户端发送给服务端的命令
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "commandType", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientCommand {
    /// 以玩家或旁观者身份加入对局
    Connect {
        #[serde(rename = "authToken")]
        auth_token: SessionToken,
        #[serde(rename = "gameID")]
        game_id: GameId,
    },
    /// 走棋
    MakeMove {
        #[serde(rename = "authToken")]
        auth_token: SessionToken,
        #[serde(rename = "gameID")]
        game_id: GameId,
        #[serde(rename = "move")]
        mv: Move,
    },
    /// 离开对局
    Leave {
        #[serde(rename = "authToken")]
        auth_token: SessionToken,
        #[serde(rename = "gameID")]
        game_id: GameId,
    },
    /// 认输
    Resign {
        #[serde(rename = "authToken")]
        auth_token: SessionToken,
        #[serde(rename = "gameID")]
        game_id: GameId,
    },
}

impl ClientCommand {
    /// 命令携带的会话令牌
    pub fn auth_token(&self) -> &str {
        match self {
            ClientCommand::Connect { auth_token, .. }
            | ClientCommand::MakeMove { auth_token, .. }
            | ClientCommand::Leave { auth_token, .. }
            | ClientCommand::Resign { auth_token, .. } => auth_token,
        }
    }

    /// 命令针对的对局 ID
    pub fn game_id(&self) -> GameId {
        match self {
            ClientCommand::Connect { game_id, .. }
            | ClientCommand::MakeMove { game_id, .. }
            | ClientCommand::Leave { game_id, .. }
            | ClientCommand::Resign { game_id, .. } => *game_id,
        }
    }
}

/// 服务端发送给客户端的消息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "serverMessageType", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServerMessage {
    /// 推送完整对局状态
    LoadGame { game: GameData },
    /// 人类可读的事件通知
    Notification { message: String },
    /// 错误回报（只发给出错的那个客户端）
    Error {
        #[serde(rename = "errorMessage")]
        error_message: String,
    },
}

/// 对局数据（对局本体 + 席位归属）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameData {
    #[serde(rename = "gameID")]
    pub game_id: GameId,
    /// 白方席位占有者，空席为 None
    #[serde(rename = "whiteUsername")]
    pub white_username: Option<String>,
    /// 黑方席位占有者，空席为 None
    #[serde(rename = "blackUsername")]
    pub black_username: Option<String>,
    #[serde(rename = "gameName")]
    pub game_name: String,
    /// 对局本体
    pub game: Game,
}

impl GameData {
    /// 创建新对局数据（双方席位均空）
    pub fn new(game_id: GameId, game_name: impl Into<String>) -> Self {
        Self {
            game_id,
            white_username: None,
            black_username: None,
            game_name: game_name.into(),
            game: Game::new(),
        }
    }

    /// 查询用户占据的席位，旁观者返回 None
    pub fn seat_of(&self, username: &str) -> Option<Color> {
        if self.white_username.as_deref() == Some(username) {
            Some(Color::White)
        } else if self.black_username.as_deref() == Some(username) {
            Some(Color::Black)
        } else {
            None
        }
    }

    /// 查询席位上的用户名
    pub fn username_of(&self, color: Color) -> Option<&str> {
        match color {
            Color::White => self.white_username.as_deref(),
            Color::Black => self.black_username.as_deref(),
        }
    }

    /// 用户是否是对局玩家（而非旁观者）
    pub fn is_player(&self, username: &str) -> bool {
        self.seat_of(username).is_some()
    }

    /// 腾空指定用户占据的席位
    pub fn vacate(&mut self, username: &str) {
        if self.white_username.as_deref() == Some(username) {
            self.white_username = None;
        }
        if self.black_username.as_deref() == Some(username) {
            self.black_username = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::piece::Position;
    use serde_json::json;

    #[test]
    fn test_connect_command_wire_format() {
        let json = r#"{"commandType":"CONNECT","authToken":"token-1","gameID":42}"#;
        let cmd: ClientCommand = serde_json::from_str(json).unwrap();

        assert_eq!(
            cmd,
            ClientCommand::Connect {
                auth_token: "token-1".to_string(),
                game_id: 42,
            }
        );
        assert_eq!(cmd.auth_token(), "token-1");
        assert_eq!(cmd.game_id(), 42);
    }

    #[test]
    fn test_make_move_command_wire_format() {
        let json = r#"{
            "commandType": "MAKE_MOVE",
            "authToken": "token-1",
            "gameID": 7,
            "move": {"start": {"row": 2, "col": 5}, "end": {"row": 4, "col": 5}}
        }"#;
        let cmd: ClientCommand = serde_json::from_str(json).unwrap();

        match cmd {
            ClientCommand::MakeMove { mv, game_id, .. } => {
                assert_eq!(game_id, 7);
                assert_eq!(mv.start, Position::new_unchecked(2, 5));
                assert_eq!(mv.end, Position::new_unchecked(4, 5));
                assert_eq!(mv.promotion, None);
            }
            other => panic!("Wrong command type: {:?}", other),
        }
    }

    #[test]
    fn test_move_promotion_field_optional() {
        let json = r#"{
            "start": {"row": 7, "col": 1},
            "end": {"row": 8, "col": 1},
            "promotion": "QUEEN"
        }"#;
        let mv: Move = serde_json::from_str(json).unwrap();
        assert_eq!(mv.promotion, Some(crate::piece::PieceKind::Queen));
    }

    #[test]
    fn test_unknown_command_type_rejected() {
        let json = r#"{"commandType":"DANCE","authToken":"t","gameID":1}"#;
        assert!(serde_json::from_str::<ClientCommand>(json).is_err());
    }

    #[test]
    fn test_server_message_wire_format() {
        let msg = ServerMessage::Notification {
            message: "白方认输".to_string(),
        };
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["serverMessageType"], "NOTIFICATION");
        assert_eq!(value["message"], "白方认输");

        let msg = ServerMessage::Error {
            error_message: "Not your turn".to_string(),
        };
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["serverMessageType"], "ERROR");
        assert_eq!(value["errorMessage"], "Not your turn");
    }

    #[test]
    fn test_load_game_wire_format() {
        let data = GameData::new(3, "测试对局");
        let msg = ServerMessage::LoadGame { game: data };
        let value = serde_json::to_value(&msg).unwrap();

        assert_eq!(value["serverMessageType"], "LOAD_GAME");
        assert_eq!(value["game"]["gameID"], 3);
        assert_eq!(value["game"]["gameName"], "测试对局");
        assert_eq!(value["game"]["whiteUsername"], json!(null));
        assert_eq!(value["game"]["blackUsername"], json!(null));

        let decoded: ServerMessage = serde_json::from_value(value).unwrap();
        assert_eq!(decoded, msg);
    }

    #[test]
    fn test_seat_helpers() {
        let mut data = GameData::new(1, "对局");
        data.white_username = Some("alice".to_string());
        data.black_username = Some("bob".to_string());

        assert_eq!(data.seat_of("alice"), Some(Color::White));
        assert_eq!(data.seat_of("bob"), Some(Color::Black));
        assert_eq!(data.seat_of("carol"), None);
        assert!(data.is_player("alice"));
        assert!(!data.is_player("carol"));
        assert_eq!(data.username_of(Color::White), Some("alice"));

        data.vacate("alice");
        assert_eq!(data.white_username, None);
        assert_eq!(data.black_username.as_deref(), Some("bob"));
    }
}
