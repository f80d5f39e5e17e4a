//! 错误类型定义

use thiserror::Error;

/// 棋规错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChessError {
    /// 不是你的回合
    #[error("Not your turn")]
    NotYourTurn,

    /// 非法走法（几何不合法或走后己方被将军）
    #[error("Illegal move")]
    IllegalMove,

    /// 对局已结束
    #[error("Game is already over")]
    AlreadyEnded,

    /// 无效的 FEN 字符串
    #[error("Invalid FEN string: {reason}")]
    InvalidFen { reason: String },
}

/// 协议错误类型
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// IO 错误
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON 序列化错误
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// 协议版本不匹配
    #[error("Protocol version mismatch: expected {expected}, got {actual}")]
    VersionMismatch { expected: u8, actual: u8 },

    /// 帧大小超限
    #[error("Frame too large: {size} bytes (max: {max})")]
    FrameTooLarge { size: usize, max: usize },

    /// 连接超时
    #[error("Connection timeout")]
    ConnectionTimeout,

    /// 连接已关闭
    #[error("Connection closed")]
    ConnectionClosed,

    /// 无法解析的命令
    #[error("Malformed command: {reason}")]
    MalformedCommand { reason: String },

    /// 无效的会话令牌
    #[error("Unauthorized: invalid auth token")]
    Unauthorized,

    /// 对局不存在
    #[error("Game not found: {game_id}")]
    GameNotFound { game_id: u32 },

    /// 旁观者不能执行该操作
    #[error("Spectators cannot perform this action")]
    SpectatorForbidden,

    /// 棋规错误
    #[error("Chess error: {0}")]
    Chess(#[from] ChessError),
}

/// 协议操作结果类型
pub type Result<T> = std::result::Result<T, ProtocolError>;
