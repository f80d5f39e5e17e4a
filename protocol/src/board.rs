//! 棋盘状态

use serde::{Deserialize, Serialize};

use crate::constants::BOARD_SIZE;
use crate::moves::Move;
use crate::piece::{Color, Piece, PieceKind, Position};

/// 棋盘
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    /// 8x8 棋盘，索引为 (row-1) * 8 + (col-1)，使用 Vec 以支持 serde
    squares: Vec<Option<Piece>>,
}

impl Board {
    /// 创建空棋盘
    pub fn empty() -> Self {
        Self {
            squares: vec![None; BOARD_SIZE * BOARD_SIZE],
        }
    }

    /// 创建初始棋盘（国际象棋标准开局）
    pub fn initial() -> Self {
        let mut board = Self::empty();

        let back_rank = [
            PieceKind::Rook,
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Queen,
            PieceKind::King,
            PieceKind::Bishop,
            PieceKind::Knight,
            PieceKind::Rook,
        ];

        // 白方：第 1 行底线 + 第 2 行兵
        for (i, &kind) in back_rank.iter().enumerate() {
            let col = i as u8 + 1;
            board.set(Position::new_unchecked(1, col), Some(Piece::new(kind, Color::White)));
            board.set(
                Position::new_unchecked(2, col),
                Some(Piece::new(PieceKind::Pawn, Color::White)),
            );
        }

        // 黑方：第 8 行底线 + 第 7 行兵（与白方镜像）
        for (i, &kind) in back_rank.iter().enumerate() {
            let col = i as u8 + 1;
            board.set(Position::new_unchecked(8, col), Some(Piece::new(kind, Color::Black)));
            board.set(
                Position::new_unchecked(7, col),
                Some(Piece::new(PieceKind::Pawn, Color::Black)),
            );
        }

        board
    }

    /// 获取指定位置的棋子
    pub fn get(&self, pos: Position) -> Option<Piece> {
        if pos.is_valid() {
            self.squares[pos.to_index()]
        } else {
            None
        }
    }

    /// 设置指定位置的棋子
    pub fn set(&mut self, pos: Position, piece: Option<Piece>) {
        if pos.is_valid() {
            self.squares[pos.to_index()] = piece;
        }
    }

    /// 执行一步走法（不检查规则），返回被吃的棋子
    ///
    /// 如果走法带升变，落点放置升变后的新棋子而不是原来的兵。
    pub fn apply_move(&mut self, mv: &Move, mover: Color) -> Option<Piece> {
        let piece = self.get(mv.start);
        let captured = self.get(mv.end);
        self.set(mv.start, None);
        match mv.promotion {
            Some(kind) => self.set(mv.end, Some(Piece::new(kind, mover))),
            None => self.set(mv.end, piece),
        }
        captured
    }

    /// 查找指定阵营的王的位置
    pub fn find_king(&self, color: Color) -> Option<Position> {
        self.all_pieces()
            .into_iter()
            .find(|(_, piece)| piece.kind == PieceKind::King && piece.color == color)
            .map(|(pos, _)| pos)
    }

    /// 获取指定阵营的所有棋子及位置
    pub fn pieces(&self, color: Color) -> Vec<(Position, Piece)> {
        self.all_pieces()
            .into_iter()
            .filter(|(_, piece)| piece.color == color)
            .collect()
    }

    /// 获取所有棋子及位置
    pub fn all_pieces(&self) -> Vec<(Position, Piece)> {
        self.squares
            .iter()
            .enumerate()
            .filter_map(|(index, square)| {
                square.and_then(|piece| Position::from_index(index).map(|pos| (pos, piece)))
            })
            .collect()
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::initial()
    }
}
