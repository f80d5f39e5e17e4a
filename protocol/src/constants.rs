//! 协议常量定义

use std::time::Duration;

/// 协议版本号
pub const PROTOCOL_VERSION: u8 = 1;

/// 棋盘边长（8x8）
pub const BOARD_SIZE: usize = 8;

/// 消息帧最大大小
pub const MAX_FRAME_SIZE: usize = 65536;

/// 连接超时（秒）
pub const CONNECT_TIMEOUT_SECS: u64 = 10;

/// 连接超时 Duration
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(CONNECT_TIMEOUT_SECS);

/// 服务端默认监听端口
pub const DEFAULT_PORT: u16 = 8080;
