//! 国际象棋共享协议库
//!
//! 包含:
//! - 棋子、棋盘、位置等核心数据结构
//! - 走法生成和规则验证（将军、将死、逼和）
//! - 对局状态机 (Game, GameStatus)
//! - 消息类型定义 (ClientCommand, ServerMessage)
//! - 传输层抽象 (Connector, Connection, Listener traits)
//! - 帧编解码 (FrameReader, FrameWriter)
//! - FEN 棋谱格式

mod board;
mod constants;
mod error;
mod fen;
mod game;
mod message;
mod moves;
mod piece;
mod transport;

pub use board::Board;
pub use constants::*;
pub use error::{ChessError, ProtocolError, Result};
pub use fen::{Fen, INITIAL_FEN};
pub use game::{EndReason, Game, GameStatus};
pub use message::{ClientCommand, GameData, GameId, ServerMessage, SessionToken};
pub use moves::{Move, MoveGenerator};
pub use piece::{Color, Piece, PieceKind, Position, PROMOTION_KINDS};
pub use transport::{
    Connection, Connector, FrameReader, FrameWriter, Listener, NetworkConfig, TcpConnection,
    TcpConnector, TcpListener,
};
