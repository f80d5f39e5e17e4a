//! 棋子定义

use serde::{Deserialize, Serialize};

use crate::constants::BOARD_SIZE;

/// 棋子类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PieceKind {
    /// 王
    King,
    /// 后
    Queen,
    /// 车
    Rook,
    /// 象
    Bishop,
    /// 马
    Knight,
    /// 兵
    Pawn,
}

/// 兵升变可选的棋子类型（不含王和兵）
pub const PROMOTION_KINDS: [PieceKind; 4] = [
    PieceKind::Queen,
    PieceKind::Rook,
    PieceKind::Bishop,
    PieceKind::Knight,
];

impl PieceKind {
    /// 获取 FEN 字符（白方大写，黑方小写）
    pub fn to_fen_char(&self, color: Color) -> char {
        let c = match self {
            PieceKind::King => 'k',
            PieceKind::Queen => 'q',
            PieceKind::Rook => 'r',
            PieceKind::Bishop => 'b',
            PieceKind::Knight => 'n',
            PieceKind::Pawn => 'p',
        };
        match color {
            Color::White => c.to_ascii_uppercase(),
            Color::Black => c,
        }
    }

    /// 从 FEN 字符解析
    pub fn from_fen_char(c: char) -> Option<(PieceKind, Color)> {
        let color = if c.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        let kind = match c.to_ascii_lowercase() {
            'k' => PieceKind::King,
            'q' => PieceKind::Queen,
            'r' => PieceKind::Rook,
            'b' => PieceKind::Bishop,
            'n' => PieceKind::Knight,
            'p' => PieceKind::Pawn,
            _ => return None,
        };
        Some((kind, color))
    }
}

/// 阵营
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Color {
    /// 白方（先手）
    White,
    /// 黑方（后手）
    Black,
}

impl Color {
    /// 获取对方阵营
    pub fn opponent(&self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// 兵的前进方向（白方行号增大，黑方行号减小）
    pub fn forward(&self) -> i8 {
        match self {
            Color::White => 1,
            Color::Black => -1,
        }
    }

    /// 兵的初始行（未动过的兵可以走两格）
    pub fn pawn_rank(&self) -> u8 {
        match self {
            Color::White => 2,
            Color::Black => 7,
        }
    }

    /// 兵的升变行（最远的一行）
    pub fn promotion_rank(&self) -> u8 {
        match self {
            Color::White => 8,
            Color::Black => 1,
        }
    }

    /// 获取 FEN 字符
    pub fn to_fen_char(&self) -> char {
        match self {
            Color::White => 'w',
            Color::Black => 'b',
        }
    }

    /// 从 FEN 字符解析
    pub fn from_fen_char(c: char) -> Option<Color> {
        match c {
            'w' | 'W' => Some(Color::White),
            'b' | 'B' => Some(Color::Black),
            _ => None,
        }
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Color::White => write!(f, "白方"),
            Color::Black => write!(f, "黑方"),
        }
    }
}

/// 棋子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Piece {
    pub kind: PieceKind,
    pub color: Color,
}

impl Piece {
    /// 创建新棋子
    pub fn new(kind: PieceKind, color: Color) -> Self {
        Self { kind, color }
    }

    /// 获取 FEN 字符
    pub fn to_fen_char(&self) -> char {
        self.kind.to_fen_char(self.color)
    }

    /// 从 FEN 字符解析
    pub fn from_fen_char(c: char) -> Option<Piece> {
        PieceKind::from_fen_char(c).map(|(kind, color)| Piece { kind, color })
    }
}

/// 棋盘位置（行列均为 1-8）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    /// 行 (1-8)，白方在第 1、2 行
    pub row: u8,
    /// 列 (1-8)
    pub col: u8,
}

impl Position {
    /// 创建新位置，越界返回 None
    pub fn new(row: u8, col: u8) -> Option<Self> {
        let pos = Self { row, col };
        if pos.is_valid() {
            Some(pos)
        } else {
            None
        }
    }

    /// 创建新位置（不检查边界，内部使用）
    pub const fn new_unchecked(row: u8, col: u8) -> Self {
        Self { row, col }
    }

    /// 检查位置是否在棋盘内
    pub fn is_valid(&self) -> bool {
        (1..=BOARD_SIZE as u8).contains(&self.row) && (1..=BOARD_SIZE as u8).contains(&self.col)
    }

    /// 获取偏移后的位置，越界返回 None
    pub fn offset(&self, dr: i8, dc: i8) -> Option<Position> {
        let new_row = self.row as i8 + dr;
        let new_col = self.col as i8 + dc;
        if (1..=BOARD_SIZE as i8).contains(&new_row) && (1..=BOARD_SIZE as i8).contains(&new_col) {
            Some(Position {
                row: new_row as u8,
                col: new_col as u8,
            })
        } else {
            None
        }
    }

    /// 转换为数组索引
    pub fn to_index(&self) -> usize {
        (self.row as usize - 1) * BOARD_SIZE + (self.col as usize - 1)
    }

    /// 从数组索引转换
    pub fn from_index(index: usize) -> Option<Self> {
        if index < BOARD_SIZE * BOARD_SIZE {
            Some(Position {
                row: (index / BOARD_SIZE) as u8 + 1,
                col: (index % BOARD_SIZE) as u8 + 1,
            })
        } else {
            None
        }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_piece_fen_char() {
        let white_king = Piece::new(PieceKind::King, Color::White);
        assert_eq!(white_king.to_fen_char(), 'K');

        let black_queen = Piece::new(PieceKind::Queen, Color::Black);
        assert_eq!(black_queen.to_fen_char(), 'q');

        assert_eq!(
            Piece::from_fen_char('N'),
            Some(Piece::new(PieceKind::Knight, Color::White))
        );
        assert_eq!(
            Piece::from_fen_char('p'),
            Some(Piece::new(PieceKind::Pawn, Color::Black))
        );
        assert_eq!(Piece::from_fen_char('x'), None);
    }

    #[test]
    fn test_position_valid() {
        assert!(Position::new(1, 1).is_some());
        assert!(Position::new(8, 8).is_some());
        assert!(Position::new(0, 1).is_none());
        assert!(Position::new(1, 9).is_none());
    }

    #[test]
    fn test_position_offset() {
        let pos = Position::new_unchecked(1, 1);
        assert_eq!(pos.offset(1, 1), Some(Position::new_unchecked(2, 2)));
        assert_eq!(pos.offset(-1, 0), None);
        assert_eq!(pos.offset(0, -1), None);

        let pos = Position::new_unchecked(8, 8);
        assert_eq!(pos.offset(0, 1), None);
        assert_eq!(pos.offset(-2, -1), Some(Position::new_unchecked(6, 7)));
    }

    #[test]
    fn test_position_index_roundtrip() {
        for index in 0..64 {
            let pos = Position::from_index(index).unwrap();
            assert!(pos.is_valid());
            assert_eq!(pos.to_index(), index);
        }
        assert!(Position::from_index(64).is_none());
    }

    #[test]
    fn test_color_opponent() {
        assert_eq!(Color::White.opponent(), Color::Black);
        assert_eq!(Color::Black.opponent(), Color::White);
    }

    #[test]
    fn test_pawn_ranks() {
        assert_eq!(Color::White.pawn_rank(), 2);
        assert_eq!(Color::White.promotion_rank(), 8);
        assert_eq!(Color::Black.pawn_rank(), 7);
        assert_eq!(Color::Black.promotion_rank(), 1);
    }
}
