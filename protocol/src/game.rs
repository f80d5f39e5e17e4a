//! 对局状态机
//!
//! `Game` 持有棋盘、走子方和对局状态，是规则的唯一权威：
//! 合法走法 = 伪合法走法中走后己方王不被将军的那部分。
//! 对局一旦结束（将死/逼和/认输）即不可再变。

use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::error::ChessError;
use crate::moves::{Move, MoveGenerator};
use crate::piece::{Color, Position};

/// 对局结束原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndReason {
    /// 将死（参数为被将死的一方）
    Checkmate(Color),
    /// 逼和（无子可动但未被将军）
    Stalemate,
    /// 认输（参数为认输的一方）
    Resignation(Color),
}

/// 对局状态
///
/// 终局状态只通过该标签表达，绝不编码在棋盘内容里。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    /// 进行中
    Active,
    /// 已结束
    Ended(EndReason),
}

/// 对局
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    /// 棋盘
    pub board: Board,
    /// 当前走子方
    pub turn: Color,
    /// 对局状态
    pub status: GameStatus,
}

impl Game {
    /// 创建新对局（标准开局，白方先走）
    pub fn new() -> Self {
        Self {
            board: Board::initial(),
            turn: Color::White,
            status: GameStatus::Active,
        }
    }

    /// 从给定棋盘创建对局（测试和 FEN 加载使用）
    pub fn from_board(board: Board, turn: Color) -> Self {
        Self {
            board,
            turn,
            status: GameStatus::Active,
        }
    }

    /// 对局是否已结束
    pub fn is_over(&self) -> bool {
        matches!(self.status, GameStatus::Ended(_))
    }

    /// 生成指定位置棋子的所有合法走法
    ///
    /// 每个伪合法走法在棋盘副本上模拟执行，走后己方被将军的丢弃。
    /// 模拟只作用于副本，任何路径都不会改动真实棋盘。
    /// 空位置返回空列表。成本 O(棋子数 × 每子走法数)，8x8 棋盘可以接受。
    pub fn legal_moves(&self, pos: Position) -> Vec<Move> {
        let piece = match self.board.get(pos) {
            Some(p) => p,
            None => return Vec::new(),
        };

        MoveGenerator::pseudo_moves(&self.board, pos)
            .into_iter()
            .filter(|mv| {
                let mut scratch = self.board.clone();
                scratch.apply_move(mv, piece.color);
                !MoveGenerator::is_in_check(&scratch, piece.color)
            })
            .collect()
    }

    /// 生成指定阵营所有棋子的合法走法
    pub fn all_legal_moves(&self, color: Color) -> Vec<Move> {
        let mut moves = Vec::new();
        for (pos, _) in self.board.pieces(color) {
            moves.extend(self.legal_moves(pos));
        }
        moves
    }

    /// 检查指定阵营是否被将军
    pub fn is_in_check(&self, color: Color) -> bool {
        MoveGenerator::is_in_check(&self.board, color)
    }

    /// 检查指定阵营是否被将死（被将军且无合法走法）
    pub fn is_in_checkmate(&self, color: Color) -> bool {
        self.is_in_check(color) && self.all_legal_moves(color).is_empty()
    }

    /// 检查指定阵营是否被逼和（未被将军但无合法走法）
    pub fn is_in_stalemate(&self, color: Color) -> bool {
        !self.is_in_check(color) && self.all_legal_moves(color).is_empty()
    }

    /// 执行一步走法
    ///
    /// 校验全部通过后才改动棋盘，因此任何失败都保证棋盘
    /// 与调用前完全一致。成功后切换走子方并重新判定对局状态。
    pub fn make_move(&mut self, mv: Move) -> Result<(), ChessError> {
        if self.is_over() {
            return Err(ChessError::AlreadyEnded);
        }

        // 起点必须有己方（当前走子方）的棋子
        match self.board.get(mv.start) {
            Some(piece) if piece.color == self.turn => {}
            _ => return Err(ChessError::NotYourTurn),
        }

        if !self.legal_moves(mv.start).contains(&mv) {
            return Err(ChessError::IllegalMove);
        }

        self.board.apply_move(&mv, self.turn);
        self.turn = self.turn.opponent();

        // 对新的走子方判定将死/逼和
        if self.all_legal_moves(self.turn).is_empty() {
            self.status = if self.is_in_check(self.turn) {
                GameStatus::Ended(EndReason::Checkmate(self.turn))
            } else {
                GameStatus::Ended(EndReason::Stalemate)
            };
        }

        Ok(())
    }

    /// 认输
    pub fn resign(&mut self, color: Color) -> Result<(), ChessError> {
        if self.is_over() {
            return Err(ChessError::AlreadyEnded);
        }
        self.status = GameStatus::Ended(EndReason::Resignation(color));
        Ok(())
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}
