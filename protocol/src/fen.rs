//! FEN 格式解析和生成
//!
//! 国际象棋 FEN 格式：
//! `<棋盘> <走子方> <易位权> <过路兵> <半回合数> <回合数>`
//!
//! 本实现只使用前两段（棋盘布局和走子方），后四段解析时忽略，
//! 生成时固定输出 `- - 0 1`。
//!
//! 示例：
//! `rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1`

use crate::board::Board;
use crate::error::ChessError;
use crate::game::Game;
use crate::piece::{Color, Piece, Position};

/// 初始局面 FEN
pub const INITIAL_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// FEN 格式处理
pub struct Fen;

impl Fen {
    /// 解析 FEN 字符串为对局
    pub fn parse(fen: &str) -> Result<Game, ChessError> {
        let parts: Vec<&str> = fen.split_whitespace().collect();
        if parts.is_empty() {
            return Err(ChessError::InvalidFen {
                reason: "Empty FEN string".to_string(),
            });
        }

        // 解析棋盘
        let board = Self::parse_board(parts[0])?;

        // 解析走子方（默认白方）
        let turn = if parts.len() > 1 {
            Color::from_fen_char(parts[1].chars().next().unwrap_or('w')).unwrap_or(Color::White)
        } else {
            Color::White
        };

        Ok(Game::from_board(board, turn))
    }

    /// 解析棋盘部分
    fn parse_board(board_str: &str) -> Result<Board, ChessError> {
        let mut board = Board::empty();
        let rows: Vec<&str> = board_str.split('/').collect();

        if rows.len() != 8 {
            return Err(ChessError::InvalidFen {
                reason: format!("Expected 8 rows, got {}", rows.len()),
            });
        }

        // FEN 从上到下是第 8 行到第 1 行
        for (row_idx, row_str) in rows.iter().enumerate() {
            let row = 8 - row_idx as u8;
            let mut col = 1u8;

            for c in row_str.chars() {
                if col > 8 {
                    return Err(ChessError::InvalidFen {
                        reason: format!("Row {} has too many columns", row),
                    });
                }

                if c.is_ascii_digit() {
                    // 连续空格数量
                    let empty_count = c.to_digit(10).unwrap_or(0) as u8;
                    col += empty_count;
                } else if let Some(piece) = Piece::from_fen_char(c) {
                    board.set(Position::new_unchecked(row, col), Some(piece));
                    col += 1;
                } else {
                    return Err(ChessError::InvalidFen {
                        reason: format!("Invalid piece character: {}", c),
                    });
                }
            }

            if col != 9 {
                return Err(ChessError::InvalidFen {
                    reason: format!("Row {} has {} columns, expected 8", row, col - 1),
                });
            }
        }

        Ok(board)
    }

    /// 将对局转换为 FEN 字符串
    pub fn to_string(game: &Game) -> String {
        format!(
            "{} {} - - 0 1",
            Self::board_to_string(&game.board),
            game.turn.to_fen_char()
        )
    }

    /// 将棋盘转换为 FEN 棋盘部分
    pub fn board_to_string(board: &Board) -> String {
        let mut rows = Vec::with_capacity(8);

        // 从第 8 行到第 1 行
        for row in (1..=8u8).rev() {
            let mut row_str = String::new();
            let mut empty_count = 0;

            for col in 1..=8u8 {
                if let Some(piece) = board.get(Position::new_unchecked(row, col)) {
                    if empty_count > 0 {
                        row_str.push_str(&empty_count.to_string());
                        empty_count = 0;
                    }
                    row_str.push(piece.to_fen_char());
                } else {
                    empty_count += 1;
                }
            }

            if empty_count > 0 {
                row_str.push_str(&empty_count.to_string());
            }

            rows.push(row_str);
        }

        rows.join("/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::piece::PieceKind;

    #[test]
    fn test_parse_initial_fen() {
        let game = Fen::parse(INITIAL_FEN).unwrap();

        // 检查走子方
        assert_eq!(game.turn, Color::White);

        // 检查与标准开局棋盘一致
        assert_eq!(game.board, Board::initial());

        // 检查白王在 e1
        let king = game.board.get(Position::new_unchecked(1, 5));
        assert_eq!(king, Some(Piece::new(PieceKind::King, Color::White)));

        // 检查黑后在 d8
        let queen = game.board.get(Position::new_unchecked(8, 4));
        assert_eq!(queen, Some(Piece::new(PieceKind::Queen, Color::Black)));
    }

    #[test]
    fn test_fen_roundtrip() {
        let game = Game::new();
        let fen = Fen::to_string(&game);
        let game2 = Fen::parse(&fen).unwrap();

        assert_eq!(game.board, game2.board);
        assert_eq!(game.turn, game2.turn);
    }

    #[test]
    fn test_parse_custom_fen() {
        // 王对王残局，黑方走子
        let game = Fen::parse("4k3/8/8/8/8/8/8/4K3 b").unwrap();

        assert_eq!(game.turn, Color::Black);
        assert_eq!(game.board.all_pieces().len(), 2);
        assert_eq!(
            game.board.find_king(Color::White),
            Some(Position::new_unchecked(1, 5))
        );
        assert_eq!(
            game.board.find_king(Color::Black),
            Some(Position::new_unchecked(8, 5))
        );
    }

    #[test]
    fn test_missing_turn_defaults_to_white() {
        let game = Fen::parse("4k3/8/8/8/8/8/8/4K3").unwrap();
        assert_eq!(game.turn, Color::White);
    }

    #[test]
    fn test_invalid_fen() {
        // 空字符串
        assert!(Fen::parse("").is_err());

        // 行数不对
        assert!(Fen::parse("4k3/8/8").is_err());

        // 列数不对
        assert!(Fen::parse("4k34/8/8/8/8/8/8/4K3 w").is_err());

        // 无效字符
        assert!(Fen::parse("4x3/8/8/8/8/8/8/4K3 w").is_err());
    }
}
