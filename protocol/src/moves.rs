//! 走法生成
//!
//! 本模块生成的走法是伪合法走法：只考虑棋子几何规则和占位情况，
//! 不考虑走后己方王是否被将军（由 `Game::legal_moves` 过滤）。

use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::piece::{Color, PieceKind, Position, PROMOTION_KINDS};

/// 走法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    /// 起始位置
    pub start: Position,
    /// 目标位置
    pub end: Position,
    /// 升变类型（仅兵走到最远行时设置）
    #[serde(default)]
    pub promotion: Option<PieceKind>,
}

impl Move {
    /// 创建新走法
    pub fn new(start: Position, end: Position) -> Self {
        Self {
            start,
            end,
            promotion: None,
        }
    }

    /// 创建带升变的走法
    pub fn with_promotion(start: Position, end: Position, promotion: PieceKind) -> Self {
        Self {
            start,
            end,
            promotion: Some(promotion),
        }
    }
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.promotion {
            Some(kind) => write!(f, "{} -> {} ={:?}", self.start, self.end, kind),
            None => write!(f, "{} -> {}", self.start, self.end),
        }
    }
}

/// 车的 4 个直线方向
const ROOK_DIRS: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// 象的 4 个斜线方向
const BISHOP_DIRS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

/// 马的 8 个日字偏移
const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (2, 1),
    (2, -1),
    (-2, 1),
    (-2, -1),
    (1, 2),
    (1, -2),
    (-1, 2),
    (-1, -2),
];

/// 王的 8 个相邻偏移
const KING_OFFSETS: [(i8, i8); 8] = [
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
];

/// 走法生成器
pub struct MoveGenerator;

impl MoveGenerator {
    /// 生成指定位置棋子的所有伪合法走法
    ///
    /// 空位置返回空列表。
    pub fn pseudo_moves(board: &Board, pos: Position) -> Vec<Move> {
        let piece = match board.get(pos) {
            Some(p) => p,
            None => return Vec::new(),
        };

        let mut moves = Vec::with_capacity(16);
        match piece.kind {
            PieceKind::Rook => Self::slide(board, pos, piece.color, &ROOK_DIRS, &mut moves),
            PieceKind::Bishop => Self::slide(board, pos, piece.color, &BISHOP_DIRS, &mut moves),
            PieceKind::Queen => {
                Self::slide(board, pos, piece.color, &ROOK_DIRS, &mut moves);
                Self::slide(board, pos, piece.color, &BISHOP_DIRS, &mut moves);
            }
            PieceKind::Knight => Self::leap(board, pos, piece.color, &KNIGHT_OFFSETS, &mut moves),
            PieceKind::King => Self::leap(board, pos, piece.color, &KING_OFFSETS, &mut moves),
            PieceKind::Pawn => Self::pawn_moves(board, pos, piece.color, &mut moves),
        }
        moves
    }

    /// 生成指定阵营所有棋子的伪合法走法
    pub fn pseudo_moves_for(board: &Board, color: Color) -> Vec<Move> {
        let mut moves = Vec::with_capacity(64);
        for (pos, _) in board.pieces(color) {
            moves.extend(Self::pseudo_moves(board, pos));
        }
        moves
    }

    /// 滑行棋子（车/象/后）：沿射线逐格推进，遇到棋子截断
    fn slide(board: &Board, pos: Position, color: Color, dirs: &[(i8, i8)], moves: &mut Vec<Move>) {
        for &(dr, dc) in dirs {
            let mut current = pos;
            while let Some(to) = current.offset(dr, dc) {
                match board.get(to) {
                    Some(target) => {
                        // 遇到棋子：敌方可以吃，己方不可走，均停止推进
                        if target.color != color {
                            moves.push(Move::new(pos, to));
                        }
                        break;
                    }
                    None => moves.push(Move::new(pos, to)),
                }
                current = to;
            }
        }
    }

    /// 跳跃棋子（马/王）：固定偏移表，目标为空或敌方棋子即可走
    fn leap(board: &Board, pos: Position, color: Color, offsets: &[(i8, i8)], moves: &mut Vec<Move>) {
        for &(dr, dc) in offsets {
            if let Some(to) = pos.offset(dr, dc) {
                match board.get(to) {
                    Some(target) if target.color == color => {}
                    _ => moves.push(Move::new(pos, to)),
                }
            }
        }
    }

    /// 兵的走法：前进一格、初始行前进两格、斜吃，到达最远行时升变
    fn pawn_moves(board: &Board, pos: Position, color: Color, moves: &mut Vec<Move>) {
        let forward = color.forward();

        // 前进一格（目标必须为空）
        if let Some(to) = pos.offset(forward, 0) {
            if board.get(to).is_none() {
                Self::push_pawn_move(pos, to, color, moves);

                // 初始行前进两格（途经格与目标格都必须为空）
                if pos.row == color.pawn_rank() {
                    if let Some(two) = pos.offset(forward * 2, 0) {
                        if board.get(two).is_none() {
                            moves.push(Move::new(pos, two));
                        }
                    }
                }
            }
        }

        // 斜吃（目标必须是敌方棋子）
        for dc in [-1i8, 1i8] {
            if let Some(to) = pos.offset(forward, dc) {
                if let Some(target) = board.get(to) {
                    if target.color != color {
                        Self::push_pawn_move(pos, to, color, moves);
                    }
                }
            }
        }
    }

    /// 添加兵的走法：落点在升变行时，每种升变类型各生成一个走法
    fn push_pawn_move(start: Position, end: Position, color: Color, moves: &mut Vec<Move>) {
        if end.row == color.promotion_rank() {
            for kind in PROMOTION_KINDS {
                moves.push(Move::with_promotion(start, end, kind));
            }
        } else {
            moves.push(Move::new(start, end));
        }
    }

    /// 检查指定阵营是否被将军
    ///
    /// 即对方任一棋子的伪合法走法可以到达该方王所在的格子。
    pub fn is_in_check(board: &Board, color: Color) -> bool {
        let king_pos = match board.find_king(color) {
            Some(pos) => pos,
            None => return false, // 没有王，视为不被将军
        };

        for (pos, _) in board.pieces(color.opponent()) {
            if Self::pseudo_moves(board, pos).iter().any(|mv| mv.end == king_pos) {
                return true;
            }
        }

        false
    }
}
