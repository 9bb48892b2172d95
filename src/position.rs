//! Holds the game state and implements making and unmaking moves.
//!
//! The board is one padded array: a guard band of `-1` around the
//! playing area halts ray scans without bounds checks, the off-board
//! columns of the playing ranks hold the hand counters (negative,
//! magnitude minus one is the count), and the off-board columns of
//! rank 9 hold the per-file Pawn bulk. The Zobrist hash and the
//! piece-square evaluation are maintained incrementally by
//! `make`/`unmake` against a caller-owned `Frame`.

use crate::basetypes::*;
use crate::moves::{Move, INVALID};
use crate::tables::Tables;


/// Everything one search node needs to restore the position, plus
/// the incrementally-built key and evaluation of the position after
/// the move.
#[derive(Debug, Clone, Copy)]
pub struct Frame {
    pub hash_key: u64,
    pub new_key: u64,
    pub from_sqr: Square,
    pub to_sqr: Square,
    pub capt_sqr: Square,
    pub ep_sqr: Square,
    pub rook_sqr: Square,
    pub rights: i32,
    pub from_piece: Piece,
    pub to_piece: Piece,
    pub victim: Piece,
    pub save_piece: Piece,
    pub rook: Piece,
    /// The board delta of the origin square: the moving piece for
    /// board moves, `-1` for drops, `-2` for a null move.
    pub mutation: i32,
    pub pst_eval: Value,
    pub new_eval: Value,
    pub bulk: i32,
    /// Material swing of the last two plies.
    pub tp_gain: Value,
    pub mv: Move,
    pub whole_move: Move,
    pub depth: i32,
    pub checker: i32,
    pub check_dir: i32,
    pub check_dist: i32,
    /// King of the side that moved into this node.
    pub xking: Square,
    /// Upper end of the score interval returned to the parent.
    pub lim: Value,
}

impl Frame {
    pub fn new() -> Frame {
        Frame {
            hash_key: 0,
            new_key: 0,
            from_sqr: 0,
            to_sqr: 0,
            capt_sqr: 0,
            ep_sqr: 255,
            rook_sqr: 0,
            rights: 15,
            from_piece: 0,
            to_piece: 0,
            victim: 0,
            save_piece: 0,
            rook: 0,
            mutation: 0,
            pst_eval: 0,
            new_eval: 0,
            bulk: 0,
            tp_gain: 0,
            mv: INVALID,
            whole_move: INVALID,
            depth: 0,
            checker: CK_NONE,
            check_dir: 0,
            check_dist: 0,
            xking: 0,
            lim: 0,
        }
    }
}


/// The mutable game state: board, hands, king locations, repetition
/// store and game history.
pub struct Position {
    cells: [Piece; BOARD_RAW],
    location: [Square; 140],
    /// In-hand attack potential per side, used by the king-safety
    /// bonus and maintained by `make`/`unmake`.
    pub hand_threat: [i32; 2],
    pub stm: Color,
    pub move_nr: usize,
    pub game_moves: [Move; MAX_MOVES],
    /// Check status after every game move and search ply.
    pub check_hist: [u8; MAX_MOVES + MAX_PLY as usize],
    /// Open-addressed store of game and search positions: low 20
    /// key bits plus the packed evaluation in the high 12.
    pub rep_key: [i32; 512 + 100],
    pub rep_dep: [u8; 512 + 100],
    /// Restore data of the last root move; doubles as the parent
    /// frame of the root search node.
    pub undo: Frame,
    pub start_fen: String,
}

impl Position {
    pub fn new() -> Position {
        Position {
            cells: [GUARD; BOARD_RAW],
            location: [0; 140],
            hand_threat: [0; 2],
            stm: WHITE,
            move_nr: 0,
            game_moves: [INVALID; MAX_MOVES],
            check_hist: [CK_NONE as u8; MAX_MOVES + MAX_PLY as usize],
            rep_key: [0; 512 + 100],
            rep_dep: [0; 512 + 100],
            undo: Frame::new(),
            start_fen: String::new(),
        }
    }

    /// Reads a cell of the padded board.
    #[inline]
    pub fn at(&self, sqr: Square) -> Piece {
        self.cells[(sqr + BOARD_ORIGIN) as usize]
    }

    #[inline]
    pub fn put(&mut self, sqr: Square, piece: Piece) {
        self.cells[(sqr + BOARD_ORIGIN) as usize] = piece;
    }

    /// Where `piece` last landed. Only meaningful for royal pieces.
    #[inline]
    pub fn location(&self, piece: Piece) -> Square {
        self.location[(piece + LOC_ORIGIN) as usize]
    }

    #[inline]
    pub fn set_location(&mut self, piece: Piece, sqr: Square) {
        self.location[(piece + LOC_ORIGIN) as usize] = sqr;
    }

    /// The Pawn-bulk counter of a file.
    #[inline]
    pub fn pawn_count(&self, file: i32) -> i32 {
        self.at(PAWN_ROW + file)
    }

    /// Empties the board: guards everywhere, zeros in the playing
    /// area, sentinel bulk in the Pawn-counter row.
    pub fn clear_board(&mut self, tab: &Tables) {
        for i in 0..BOARD_RAW {
            self.cells[i] = GUARD;
        }
        for r in 0..tab.nr_ranks {
            for f in 0..tab.nr_files {
                self.put(22 * r + f, EMPTY);
            }
        }
        for f in 0..11 {
            self.put(PAWN_ROW + f, 0xF0);
        }
        for i in 0..self.rep_key.len() {
            self.rep_key[i] = 0;
            self.rep_dep[i] = 0;
        }
        for i in 0..self.check_hist.len() {
            self.check_hist[i] = CK_NONE as u8;
        }
        for i in 0..self.location.len() {
            self.location[i] = 0;
        }
        self.hand_threat = [0; 2];
    }

    /// The fast filter for moves tried while in check: `true` means
    /// the move clearly does not address the check. King moves are
    /// deferred to the king-capture test of the child node.
    fn non_evade(&self, tab: &Tables, f: &Frame) -> bool {
        if (f.from_piece & !COLOR) != ROYAL {
            if f.checker == CK_DOUBLE {
                return true; // only a king move helps
            }
            if f.to_sqr == f.checker {
                return false; // captures the checker
            }
            let d = tab.dist(f.checker - f.to_sqr);
            if d != 0 && tab.delta(f.to_sqr - f.checker) == f.check_dir && d < f.check_dist {
                return false; // interposes on the check ray
            }
            if f.from_piece + self.at(f.checker) == COLOR && (f.to_sqr - f.from_sqr) & 1 != 0 {
                // Pawn takes checking Pawn diagonally: en passant if
                // the destination is empty.
                return self.at(f.to_sqr) != EMPTY;
            }
            true
        } else {
            false
        }
    }

    /// Applies a move, building the child key and evaluation in `f`
    /// from the parent's. Returns `false` (leaving the position
    /// untouched) when the side to move is in check and the move
    /// fails the evasion filter.
    ///
    /// The caller must have set `f.checker`/`check_dir`/`check_dist`
    /// for the side about to move, and `f.hash_key`/`f.pst_eval` to
    /// the current key and (side-to-move relative) evaluation.
    pub fn make(&mut self, tab: &Tables, f: &mut Frame, mv: Move, ply: usize) -> bool {
        f.from_sqr = mv.from_square();
        let to = mv.to_square();
        f.whole_move = mv;
        f.to_sqr = tab.to_decode[to as usize];
        f.capt_sqr = f.to_sqr;
        f.from_piece = self.at(f.from_sqr);
        if f.checker != CK_NONE && self.non_evade(tab, f) {
            return false;
        }
        // The origin delta: occupant, or -1 for drops.
        f.mutation = (f.from_piece >> 7) | f.from_piece;
        f.to_piece = (f.mutation + tab.drop_type[f.from_sqr as usize])
            | tab.promo_inc[to as usize];
        f.victim = self.at(f.capt_sqr);
        f.new_eval = f.pst_eval;
        f.new_key = f.hash_key;
        f.ep_sqr = 255;

        // When not castling, `rook_sqr` saves the Pawn-bulk cell of
        // the destination file.
        f.rook_sqr = tab.sqr2file[f.to_sqr as usize] + PAWN_ROW;
        f.rook = self.at(f.rook_sqr);
        self.put(
            f.rook_sqr,
            f.rook + tab.pawn_bulk(f.to_piece) - tab.pawn_bulk(f.mutation)
                - tab.pawn_bulk(f.victim),
        );

        if to >= tab.specials {
            if tab.sqr2file[to as usize] > 11 {
                // En-passant capture: shift the capture square using
                // the double-push decode of the other color.
                f.capt_sqr = tab.to_decode[(to - 11) as usize];
                f.victim = self.at(f.capt_sqr);
                f.save_piece = self.at(f.to_sqr);
                self.put(f.capt_sqr, EMPTY);
            } else if tab.sqr2file[to as usize] < 8 {
                // Double push: grant en-passant rights if an enemy
                // Pawn landed next to us.
                let xpawn = f.to_piece ^ COLOR;
                if self.at(f.to_sqr + 1) == xpawn || self.at(f.to_sqr - 1) == xpawn {
                    f.ep_sqr = (f.from_sqr + f.to_sqr) >> 1;
                }
            } else {
                // Castling. The King "promotes" to a Rook on the
                // Rook's destination, and the real King is placed via
                // the capture square, so the check tests and unmake
                // see consistent state.
                f.rook_sqr = tab.zone_tab[to as usize]; // Rook origin
                f.rook = self.at(f.rook_sqr);
                self.put(f.rook_sqr, EMPTY);
                f.new_eval -= tab.pst(f.rook, f.rook_sqr);
                f.new_key = f.new_key.wrapping_sub(tab.key(f.rook, f.rook_sqr));
                f.capt_sqr = tab.drop_type[to as usize]; // King destination
                f.save_piece = f.victim;
                f.victim = self.at(f.capt_sqr);
                f.to_piece = f.rook;
                self.put(f.capt_sqr, f.mutation);
                f.new_eval += tab.pst(f.mutation, f.capt_sqr) + 50;
                f.new_key = f.new_key.wrapping_add(tab.key(f.mutation, f.capt_sqr));
                self.set_location(f.mutation, f.capt_sqr);
            }
        }

        self.put(f.from_sqr, f.from_piece - f.mutation); // 0, or decremented count
        self.put(f.to_sqr, f.to_piece);
        if f.victim != EMPTY && (f.victim & COLOR) == (f.to_piece & COLOR) {
            // Same-color capture: the piece keeps its color in hand.
            let slot = tab.hand_slot_same[f.victim as usize];
            let n = self.at(slot);
            self.put(slot, n - 1);
            f.new_eval += tab.promo_gain(f.to_piece) - tab.promo_gain(f.mutation)
                + tab.hand_val_same[f.victim as usize]
                + tab.pst(f.to_piece, f.to_sqr)
                - tab.pst(f.mutation, f.from_sqr)
                + tab.pst(f.victim, f.capt_sqr);
            f.new_key = f
                .new_key
                .wrapping_add(tab.key(f.to_piece, f.to_sqr))
                .wrapping_sub(tab.key(f.mutation, f.from_sqr))
                .wrapping_sub(tab.key(f.victim, f.capt_sqr))
                .wrapping_add(tab.hand_key_same[f.victim as usize]);
        } else {
            // Normal capture: the victim flips color in hand.
            let slot = tab.hand_slot[f.victim as usize];
            let n = self.at(slot);
            self.put(slot, n - 1);
            f.new_eval += tab.promo_gain(f.to_piece) - tab.promo_gain(f.mutation)
                + tab.hand_val[f.victim as usize]
                + tab.pst(f.to_piece, f.to_sqr)
                - tab.pst(f.mutation, f.from_sqr)
                + tab.pst(f.victim, f.capt_sqr);
            f.new_key = f
                .new_key
                .wrapping_add(tab.key(f.to_piece, f.to_sqr))
                .wrapping_sub(tab.key(f.mutation, f.from_sqr))
                .wrapping_sub(tab.key(f.victim, f.capt_sqr))
                .wrapping_add(tab.hand_key[f.victim as usize]);
        }

        let mover = f.to_piece & COLOR;
        f.bulk = self.hand_threat[color_index(mover)];
        self.hand_threat[color_index(mover)] +=
            tab.hand_bulk[f.victim as usize] - tab.drop_bulk[f.from_sqr as usize];
        self.set_location(f.to_piece, f.to_sqr);
        self.check_hist[self.move_nr + ply + 1] = f.checker as u8;
        true
    }

    /// Reverses `make`. The write order matters: for ordinary moves
    /// the capture square coincides with the destination, so the
    /// victim write must come after the destination restore.
    pub fn unmake(&mut self, tab: &Tables, f: &Frame) {
        self.put(f.rook_sqr, f.rook);
        self.put(f.to_sqr, f.save_piece);
        self.put(f.capt_sqr, f.victim);
        self.put(f.from_sqr, f.from_piece);
        if f.victim != EMPTY && (f.victim & COLOR) == (f.to_piece & COLOR) {
            let slot = tab.hand_slot_same[f.victim as usize];
            let n = self.at(slot);
            self.put(slot, n + 1);
        } else {
            let slot = tab.hand_slot[f.victim as usize];
            let n = self.at(slot);
            self.put(slot, n + 1);
        }
        self.hand_threat[color_index(f.to_piece & COLOR)] = f.bulk;
        self.set_location(f.from_piece, f.from_sqr);
    }

    /// Sets up a position from a FEN string, or from the remembered
    /// start position when `fen` is `None`. Unrecognized characters
    /// are skipped; the parser is as lenient as the protocol needs.
    pub fn setup(&mut self, tab: &Tables, fen: Option<&str>) {
        let fen_string = match fen {
            Some(f) => {
                self.start_fen = f.to_string();
                f.to_string()
            }
            None => self.start_fen.clone(),
        };
        self.clear_board(tab);
        let mut rights = 15;
        let mut pst_eval: Value = 0;
        let mut hash: u64 = 0;
        let mut stm = WHITE;
        let mut sqr: Square = 22 * (tab.nr_ranks - 1); // upper-left corner
        let s = fen_string.as_bytes();
        let pieces = tab.pieces.as_bytes();
        let mut i = 0;

        // Board field.
        while i < s.len() {
            let c = s[i];
            if c == b' ' || c == b'[' {
                break;
            }
            if c == b'/' {
                sqr = 22 * (sqr / 22) - 22;
            } else if c == b'*' {
                // dark squares are decoration
            } else if c >= b'0' && c <= b'9' {
                let mut n = (c - b'0') as i32;
                if i + 1 < s.len() && s[i + 1] >= b'0' && s[i + 1] <= b'9' {
                    n = n * 10 + (s[i + 1] - b'0') as i32;
                    i += 1;
                }
                sqr += n;
            } else {
                let mut prom = (c == b'+') as i32;
                let mut c = c;
                if prom != 0 {
                    i += 1;
                    if i >= s.len() {
                        break;
                    }
                    c = s[i];
                }
                let p = c & !32; // upper case
                let color = (c as i32) - (p as i32) + WHITE;
                let tilde = i + 1 < s.len() && s[i + 1] == b'~';
                if tilde {
                    prom = 1;
                    i += 1;
                }
                let mut t = 0;
                while t < pieces.len() && pieces[t] != p {
                    t += 1;
                }
                let mut t = t as i32;
                if p == b'K' {
                    t = ROYAL;
                }
                if p == b'Q' && tilde {
                    t = 0; // Q~ is a promoted Pawn, not a promoted Queen
                }
                let piece = t | color | 16 * prom;
                self.put(sqr, piece);
                self.set_location(piece, sqr);
                hash = hash.wrapping_add(tab.key(piece, sqr));
                let sign = if color & WHITE != 0 { 1 } else { -1 };
                pst_eval +=
                    sign * (tab.pst(piece, sqr) + tab.piece_values[piece as usize]);
                let pc = self.pawn_count(tab.sqr2file[sqr as usize]);
                self.put(
                    PAWN_ROW + tab.sqr2file[sqr as usize],
                    pc + tab.pawn_bulk(piece),
                );
                sqr += 1;
            }
            i += 1;
        }

        // Holdings.
        while i < s.len() && s[i] == b' ' {
            i += 1;
        }
        if i < s.len() && s[i] == b'[' {
            i += 1;
            while i < s.len() && s[i] != b']' {
                let c = s[i];
                if c == b'-' {
                    i += 1;
                    continue;
                }
                let p = c & !32;
                let color = (c as i32) - (p as i32) + WHITE;
                let mut t = 0;
                while t < pieces.len() && pieces[t] != p {
                    t += 1;
                }
                let piece = t as i32 | color;
                let slot = tab.hand_slot[(piece ^ COLOR) as usize];
                let n = self.at(slot);
                self.put(slot, n - 1);
                hash = hash.wrapping_add(tab.hand_key[(piece ^ COLOR) as usize]);
                let sign = if color & WHITE != 0 { 1 } else { -1 };
                pst_eval += sign
                    * (tab.hand_val[piece as usize] - tab.piece_values[piece as usize]);
                self.hand_threat[color_index(color)] += tab.hand_bulk[piece as usize];
                i += 1;
            }
            i += 1; // closing bracket
        }

        // Side to move, then the castling-rights field.
        let mut fields = fen_string[i..].split_whitespace();
        if let Some(side) = fields.next() {
            if side == "b" {
                stm = BLACK;
            }
        }
        if let Some(castle) = fields.next() {
            for ch in castle.chars() {
                match ch {
                    'K' => rights &= !1,
                    'k' => rights &= !2,
                    'Q' => rights &= !4,
                    'q' => rights &= !8,
                    _ => {}
                }
            }
        }

        self.undo = Frame::new();
        self.undo.rights = rights;
        // Kludge to prevent spoiling of rights by the "last move".
        self.undo.from_sqr = 44;
        self.undo.to_sqr = 44;
        self.undo.capt_sqr = 44;
        self.undo.to_piece = self.at(44);
        // `new_eval` is from the last mover's point of view.
        self.undo.new_eval = if stm == WHITE { -pst_eval } else { pst_eval };
        self.undo.new_key = hash;
        self.stm = stm;
        self.move_nr = 0;
    }

    /// Recomputes the hash from scratch; `make` maintains it
    /// incrementally, and the two must always agree.
    pub fn full_hash(&self, tab: &Tables) -> u64 {
        let mut hash: u64 = 0;
        for r in 0..tab.nr_ranks {
            for f in 0..tab.nr_files {
                let sqr = 22 * r + f;
                let piece = self.at(sqr);
                if piece > EMPTY {
                    hash = hash.wrapping_add(tab.key(piece, sqr));
                }
            }
        }
        let mut seen = [false; 242];
        for p in WHITE..COLOR {
            let slot = tab.hand_slot[p as usize];
            if slot == 11 * 21 + 4 || seen[slot as usize] {
                continue; // unused-piece dump, or already counted
            }
            seen[slot as usize] = true;
            let mut n = self.at(slot);
            while n < -1 {
                hash = hash.wrapping_add(tab.key(-1, slot));
                n += 1;
            }
        }
        hash
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::Tables;
    use crate::variant::find_variant;

    #[test]
    fn test_setup_start_positions() {
        for name in ["crazyhouse", "minishogi", "shogi", "torishogi", "crazywa"].iter() {
            let tab = Tables::new(find_variant(name));
            let mut pos = Position::new();
            pos.setup(&tab, Some(tab.start_fen));
            assert_eq!(pos.stm, WHITE, "{}", name);
            // Both kings on the board and tracked.
            let wk = pos.location(WHITE + ROYAL);
            let bk = pos.location(BLACK + ROYAL);
            assert_eq!(pos.at(wk), WHITE + ROYAL, "{}", name);
            assert_eq!(pos.at(bk), BLACK + ROYAL, "{}", name);
            // The incremental key of the start position matches the
            // recomputed one.
            assert_eq!(pos.undo.new_key, pos.full_hash(&tab), "{}", name);
        }
    }

    #[test]
    fn test_setup_holdings() {
        let tab = Tables::new(find_variant("shogi"));
        let mut pos = Position::new();
        pos.setup(
            &tab,
            Some("ln1gkg1nl/1r5b1/p1pppp1pp/9/1p3Sp2/9/PPPPPPPPP/1B5R1/LNSGKG1NL[S] b -"),
        );
        assert_eq!(pos.stm, BLACK);
        // One white Silver in hand: the counter sits one below -1.
        let slot = tab.hand_slot[(BLACK + 2) as usize];
        assert_eq!(pos.at(slot), -2);
        assert_eq!(pos.undo.new_key, pos.full_hash(&tab));
    }

    #[test]
    fn test_castling_rights_parse() {
        let tab = Tables::new(find_variant("crazyhouse"));
        let mut pos = Position::new();
        pos.setup(&tab, Some(tab.start_fen));
        assert_eq!(pos.undo.rights, 0); // KQkq grants everything
        pos.setup(&tab, Some("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w Kq -"));
        assert_eq!(pos.undo.rights, 15 & !1 & !8);
    }

    #[test]
    fn test_pawn_bulk_counters() {
        let tab = Tables::new(find_variant("shogi"));
        let mut pos = Position::new();
        pos.setup(&tab, Some(tab.start_fen));
        // One Pawn of each color per file: bulk 2 + 4*2 over the
        // 0xF0 sentinel.
        for f in 0..9 {
            assert_eq!(pos.pawn_count(f), 0xF0 + 2 + 8);
        }
    }
}
