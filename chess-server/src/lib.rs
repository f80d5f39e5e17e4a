//! 国际象棋对局服务端
//!
//! 包含:
//! - 连接注册表与广播
//! - 会话鉴权
//! - 对局存储
//! - 命令处理（加入/走棋/离开/认输）
//! - TCP 接入层

pub mod auth;
pub mod handler;
pub mod registry;
pub mod server;
pub mod store;

pub use auth::{AuthService, Identity, MemoryAuthService};
pub use handler::SessionHandler;
pub use registry::ConnectionRegistry;
pub use server::{ChessServer, ServerContext};
pub use store::{GameStore, MemoryGameStore};
