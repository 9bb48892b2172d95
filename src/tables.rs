//! Builds every derived table the engine needs for one variant: the
//! capture-code geometry over the padded board vector, per-piece
//! reachability codes, promotion zones, the decode tables for
//! specially-encoded destinations, hand-slot maps, piece-square
//! tables, and the Zobrist key material.
//!
//! All of this is immutable for the lifetime of a game (with one
//! exception: crazyhouse swaps the Knight table in the middle game),
//! so it lives in its own struct and the mutable position state only
//! borrows it.

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

use crate::basetypes::*;
use crate::variant::{VariantDesc, STEPS, TORI_NR, VARIANTS};


/// One decoded direction of a piece.
#[derive(Debug, Clone, Copy)]
pub struct StepDescriptor {
    /// Board-vector step; `0` terminates a direction list.
    pub delta: i32,
    /// Maximum number of repetitions of the step.
    pub range: i32,
    /// The step may not capture (divergent mover).
    pub move_only: bool,
    /// The step must capture (divergent mover).
    pub capt_only: bool,
    /// A second, double-length step is available from the pawn rank.
    pub has_double: bool,
}

// Indices of the piece-square tables within `pst_data`. Table 1
// doubles as the table for pieces in hand: the hand slots live in
// the off-board columns, which the center table leaves free.
const PST_ZERO: usize = 0;
const PST_CENTER: usize = 1;
const PST_KING: usize = 2;
const PST_PAWN: usize = 3;
const PST_KNIGHT: usize = 4;
const PST_OWL: usize = 5;
const PST_PROMO: usize = 6;
const PST_GENERAL: usize = 7;
const PST_ROOK: usize = 8;
const PST_TABS: usize = 9;
const PST_SQUARES: usize = 242;

/// The derived tables for one variant.
pub struct Tables {
    pub variant: usize,
    pub nr_files: i32,
    pub nr_ranks: i32,
    pub zone: i32,
    pub board_end: Square,
    pub specials: Square,
    pub max_drop: i32,
    pub lance_mask: i32,
    pub perp_loses: i32,
    pub recycle: bool,
    pub pin_codes: i32,
    pub frontier: i32,
    pub kill_zone: i32,
    pub impasse: i32,
    pub frontier_penalty: i32,
    pub kill_penalty: i32,
    /// Packed-eval deltas recognized as quasi-repetitions.
    pub pawn_gain: i32,
    pub queen_gain: i32,

    capt_code: [i32; VEC_SIZE],
    delta_vec: [i32; VEC_SIZE],
    dist_tab: [i32; VEC_SIZE],
    pub piece_code: [i32; 96],
    pub steps: Vec<StepDescriptor>,
    pub first_dir: [usize; 64],
    pub promo_code: [i32; 64],

    pub zone_tab: [i32; TAB],
    pub to_decode: [i32; TAB],
    pub drop_type: [i32; TAB],
    pub promo_inc: [i32; TAB],
    pub sqr2file: [i32; TAB],
    pub spoiler: [i32; TAB],
    pub drop_bulk: [i32; TAB],

    pub hand_slot: [i32; 97],
    pub hand_slot_same: [i32; 97],
    pub hand_key: [u64; 97],
    pub hand_key_same: [u64; 97],
    pub hand_val: [i32; 97],
    pub hand_val_same: [i32; 97],
    pub hand_bulk: [i32; 97],
    pub piece_values: [i32; 96],
    promo_gain_tab: [i32; 98],
    pawn_bulk_tab: [i32; 98],
    pub v_val: [i32; 64],
    pub a_val: [i32; 64],

    piece_key: [u32; 98],
    pub square_key: [u32; 242],
    pst_data: Vec<i32>,
    pst_base: [usize; 98],

    pub pieces: &'static str,
    pub start_fen: &'static str,
    pub name: &'static str,
    pub tag: &'static str,
    pub setup: Option<(&'static str, &'static str)>,
}

impl Tables {
    /// Capture code of a board-vector difference.
    #[inline]
    pub fn capt(&self, vec: i32) -> i32 {
        self.capt_code[(vec + VEC_ORIGIN) as usize]
    }

    /// The unit step whose multiple reaches `vec`.
    #[inline]
    pub fn delta(&self, vec: i32) -> i32 {
        self.delta_vec[(vec + VEC_ORIGIN) as usize]
    }

    /// That multiple.
    #[inline]
    pub fn dist(&self, vec: i32) -> i32 {
        self.dist_tab[(vec + VEC_ORIGIN) as usize]
    }

    /// Piece-square-table value; `piece` may be `-1` for a hand slot.
    #[inline]
    pub fn pst(&self, piece: Piece, sqr: Square) -> i32 {
        self.pst_data[self.pst_base[(piece + 1) as usize] + sqr as usize]
    }

    /// Zobrist contribution of `piece` on `sqr`; `piece` may be `-1`
    /// (the dedicated hand key, whose low 16 bits are zero).
    #[inline]
    pub fn key(&self, piece: Piece, sqr: Square) -> u64 {
        (self.piece_key[(piece + 1) as usize] as u64)
            .wrapping_mul(self.square_key[sqr as usize] as u64)
    }

    /// Pawn-bulk contribution of a piece; `piece` may be `-1`.
    #[inline]
    pub fn pawn_bulk(&self, piece: Piece) -> i32 {
        self.pawn_bulk_tab[(piece + 1) as usize]
    }

    /// Promotion gain of a piece; `piece` may be `-1`.
    #[inline]
    pub fn promo_gain(&self, piece: Piece) -> i32 {
        self.promo_gain_tab[(piece + 1) as usize]
    }

    /// The bulk bits that mark a file as full of Pawns for `stm`.
    #[inline]
    pub fn max_bulk(&self, stm: Color) -> i32 {
        if stm == WHITE {
            2
        } else {
            4 * 2
        }
    }

    /// In crazyhouse, the Knights switch to a centralizing table
    /// once the opening is over.
    pub fn develop_knights(&mut self) {
        self.pst_base[(WHITE + 1 + 1) as usize] = PST_KNIGHT * PST_SQUARES;
        self.pst_base[(BLACK + 1 + 1) as usize] = PST_KNIGHT * PST_SQUARES + 11;
    }

    pub fn new(variant: usize) -> Tables {
        let desc: &VariantDesc = &VARIANTS[variant];
        let nr_files = desc.files;
        let nr_ranks = desc.ranks;
        let zone = desc.zone;
        let board_end = 22 * nr_ranks;
        let mut max_drop = desc.hand - 1;
        // Judkins and mini-Shogi have a dummy Lance in the type list.
        if variant == 1 || variant == 2 {
            max_drop += 1;
        }

        let mut t = Tables {
            variant: variant,
            nr_files: nr_files,
            nr_ranks: nr_ranks,
            zone: zone,
            board_end: board_end,
            specials: board_end,
            max_drop: max_drop,
            lance_mask: desc.lance_mask,
            perp_loses: variant as i32,
            recycle: desc.recycle,
            pin_codes: if variant == TORI_NR { 0xFF2C } else { 0xFF1F },
            frontier: 0,
            kill_zone: 0,
            impasse: 0,
            frontier_penalty: if nr_ranks > 7 { 2 } else { 1 },
            kill_penalty: if nr_ranks > 7 { 8 } else { 2 },
            pawn_gain: 0,
            queen_gain: 0,
            capt_code: [0; VEC_SIZE],
            delta_vec: [0; VEC_SIZE],
            dist_tab: [0; VEC_SIZE],
            piece_code: [0; 96],
            steps: decode_steps(),
            first_dir: [0; 64],
            promo_code: [0; 64],
            zone_tab: [0; TAB],
            to_decode: [0; TAB],
            drop_type: [0; TAB],
            promo_inc: [0; TAB],
            sqr2file: [0; TAB],
            spoiler: [0; TAB],
            drop_bulk: [0; TAB],
            hand_slot: [0; 97],
            hand_slot_same: [0; 97],
            hand_key: [0; 97],
            hand_key_same: [0; 97],
            hand_val: [0; 97],
            hand_val_same: [0; 97],
            hand_bulk: [0; 97],
            piece_values: [0; 96],
            promo_gain_tab: [0; 98],
            pawn_bulk_tab: [0; 98],
            v_val: [0; 64],
            a_val: [0; 64],
            piece_key: [0; 98],
            square_key: [0; 242],
            pst_data: vec![0; PST_TABS * PST_SQUARES],
            pst_base: [0; 98],
            pieces: desc.pieces,
            start_fen: desc.fen,
            name: desc.name,
            tag: desc.tag,
            setup: desc.setup,
        };

        t.frontier = if nr_ranks < 7 {
            22
        } else if nr_ranks == 7 {
            2 * 22
        } else {
            3 * 22
        };
        t.kill_zone = board_end - if nr_ranks > 6 { t.frontier + 2 * 22 } else { 0 };
        t.impasse = board_end - if nr_ranks > 6 { 3 * 22 } else { 2 * 22 };

        t.init_zobrist();
        t.init_square_tables(variant);
        t.init_hand();
        t.init_move_tables(desc);
        t.init_values(desc, variant);
        t.init_pst(desc, variant);
        t.init_capture_codes(desc.codes);
        t
    }

    fn init_zobrist(&mut self) {
        // A fixed seed keeps hashes stable from run to run, which the
        // take-back replay relies on.
        let mut rng = StdRng::seed_from_u64(0x6a3f_92d1_0c55_e417);
        for r in 0..11 {
            for f in 0..11 {
                let sqr = (22 * r + f) as usize;
                self.square_key[sqr] = rng.next_u32();
                // Low 16 bits zero for holdings squares, so board-only
                // key contributions never alias the hand.
                self.square_key[sqr + 11] = rng.next_u32() << 16;
            }
        }
        for p in WHITE..COLOR {
            self.piece_key[(p + 1) as usize] = rng.next_u32();
        }
        // The from-key of a drop is pieceKey[-1] * squareKey[slot].
        self.piece_key[0] = rng.next_u32() << 16;
    }

    fn init_square_tables(&mut self, variant: usize) {
        for r in 0..11 {
            for f in 0..11 {
                let sqr = (22 * r + f) as usize;
                let piece = 11 * r + f + WHITE - 1;
                self.sqr2file[sqr] = f;
                self.sqr2file[sqr + 11] = 12;
                self.to_decode[sqr] = sqr as i32;
                self.to_decode[sqr + 11] = sqr as i32;
                self.promo_inc[sqr] = 0;
                self.promo_inc[sqr + 11] = 16;
                self.drop_type[sqr] = 0;
                self.drop_type[sqr + 11] = piece + 1; // map counters to pieces
                if piece & 16 == 0 && piece < COLOR {
                    // Promotable piece: map it back to the counter of
                    // the flipped color, and the piece that demotes
                    // to it as well.
                    self.hand_slot[(piece ^ COLOR) as usize] = sqr as i32 + 11;
                    self.hand_slot[((piece + 16) ^ COLOR) as usize] = sqr as i32 + 11;
                    self.hand_slot_same[piece as usize] = sqr as i32 + 11;
                    self.hand_slot_same[(piece + 16) as usize] = sqr as i32 + 11;
                }
                self.zone_tab[sqr] = 0;
            }
        }
        // For decoding a hashed checker.
        self.sqr2file[CK_DOUBLE as usize] = 13;
        self.sqr2file[CK_NONE as usize] = 13;

        if variant == 0 {
            // In chess the off-board ranks 1..6 are re-assigned to
            // under-promotions in the zone.
            for f in 0..11usize {
                for r in 1..7usize {
                    self.to_decode[r * 22 + 11 + f] =
                        f as i32 + if r < 4 { 0 } else { 7 * 22 };
                }
                let inc1 = self.promo_inc[6 * 22 + 11 + f] + 1;
                self.promo_inc[1 * 22 + 11 + f] = inc1;
                self.promo_inc[6 * 22 + 11 + f] = inc1;
                let inc2 = self.promo_inc[5 * 22 + 11 + f] + 2;
                self.promo_inc[2 * 22 + 11 + f] = inc2;
                self.promo_inc[5 * 22 + 11 + f] = inc2;
                let inc3 = self.promo_inc[4 * 22 + 11 + f] + 3;
                self.promo_inc[3 * 22 + 11 + f] = inc3;
                self.promo_inc[4 * 22 + 11 + f] = inc3;
                // Double-push rows and the special Pawn move decodes.
                self.zone_tab[1 * 22 + f] = Z_DOUBLE;
                self.zone_tab[6 * 22 + f] = Z_DOUBLE;
                self.to_decode[8 * 22 + f] = 3 * 22 + f as i32; // white double push
                self.to_decode[9 * 22 + f] = 4 * 22 + f as i32; // black double push
                self.to_decode[8 * 22 + 11 + f] = 2 * 22 + f as i32; // black e.p. capture
                self.to_decode[9 * 22 + 11 + f] = 5 * 22 + f as i32; // white e.p. capture
                self.promo_inc[8 * 22 + f] = 0;
                self.promo_inc[9 * 22 + f] = 0;
                self.promo_inc[8 * 22 + 11 + f] = 0;
                self.promo_inc[9 * 22 + 11 + f] = 0;
            }
            // Castlings: the to-square encodes the Rook destination,
            // `drop_type` the King destination, `zone_tab` the Rook
            // origin.
            self.castle_decode(8, 10, 5, 6, 7); // white K-side
            self.castle_decode(9, 10, 7 * 22 + 5, 7 * 22 + 6, 7 * 22 + 7);
            self.castle_decode(8, 21, 3, 2, 0); // white Q-side
            self.castle_decode(9, 21, 7 * 22 + 3, 7 * 22 + 2, 7 * 22 + 0);
            // Initial King and Rook squares spoil castling rights.
            self.spoiler[0 * 22 + 0] = 4;
            self.spoiler[0 * 22 + 4] = 5;
            self.spoiler[0 * 22 + 7] = 1;
            self.spoiler[7 * 22 + 0] = 8;
            self.spoiler[7 * 22 + 4] = 10;
            self.spoiler[7 * 22 + 7] = 2;
            self.frontier = 2 * 22;
            self.kill_zone = 3 * 22;
            self.impasse = self.board_end;
            // All promoted pieces demote to Pawn in crazyhouse.
            for f in 0..11usize {
                self.hand_slot[WHITE as usize + 16 + f] = self.hand_slot[WHITE as usize];
                self.hand_slot[BLACK as usize + 16 + f] = self.hand_slot[BLACK as usize];
                self.hand_slot_same[WHITE as usize + 16 + f] = self.hand_slot_same[WHITE as usize];
                self.hand_slot_same[BLACK as usize + 16 + f] = self.hand_slot_same[BLACK as usize];
            }
        }

        // Promotion zones and force-promotion zones. In mini-Shogi
        // the forelast rank is not in the zone.
        for r in 0..self.zone {
            for f in 0..self.nr_files {
                let xr = self.nr_ranks - 1 - r;
                let c = Z_MUST
                    | COLOR
                    | if r == 0 { Z_LAST } else { 0 }
                    | if r < 2 && variant != 1 { Z_2ND } else { 0 };
                self.zone_tab[(22 * r + f) as usize] = Z_BLACK & c;
                self.zone_tab[(22 * xr + f) as usize] = Z_WHITE & c;
            }
        }
    }

    fn castle_decode(&mut self, r: usize, f: usize, rook_to: i32, king_to: i32, rook_from: i32) {
        let sqr = r * 22 + f;
        self.to_decode[sqr] = rook_to;
        self.drop_type[sqr] = king_to;
        self.zone_tab[sqr] = rook_from;
        self.promo_inc[sqr] = 0;
        self.sqr2file[sqr] = 11;
    }

    /// Hash keys for transfers to the holdings. Unused slots are
    /// mapped safely away from the edges first.
    fn init_hand(&mut self) {
        self.hand_slot[0] = 11 * 21 + 4;
        self.hand_slot_same[0] = 11 * 21 + 4;
        for f in 0..97 {
            if self.hand_slot_same[f] == 0 {
                self.hand_slot_same[f] = 11 * 21 + 4;
            }
        }
        for p in WHITE as usize..COLOR as usize {
            let r = self.hand_slot[p];
            self.hand_key[p] =
                (self.piece_key[0] as u64).wrapping_mul(self.square_key[r as usize] as u64);
            let r = self.hand_slot_same[p];
            self.hand_key_same[p] =
                (self.piece_key[0] as u64).wrapping_mul(self.square_key[r as usize] as u64);
        }
    }

    fn init_move_tables(&mut self, desc: &VariantDesc) {
        let mut moves = desc.dirs.iter();
        for color in [0usize, WHITE as usize].iter() {
            let color = *color;
            self.first_dir[color + 31] = *moves.next().unwrap() as usize;
            let mut i = 0;
            loop {
                let m = *moves.next().unwrap();
                if m == 255 {
                    break;
                }
                self.first_dir[color + i] = m as usize;
                i += 1;
            }
            let mut i = 16;
            loop {
                let m = *moves.next().unwrap();
                if m == 255 {
                    break;
                }
                self.first_dir[color + i] = m as usize;
                i += 1;
            }
        }
        for i in 0..16 {
            self.promo_code[i] = Z_WHITE & desc.proms[i];
            self.promo_code[i + WHITE as usize] = Z_BLACK & desc.proms[i];
        }
    }

    fn init_values(&mut self, desc: &VariantDesc, variant: usize) {
        let vals = desc.values;
        let mut ip = 0;
        let mut i = 0;
        while vals[ip] >= 0 {
            self.piece_values[(WHITE + i) as usize] = vals[ip];
            self.piece_values[(BLACK + i) as usize] = vals[ip];
            i += 1;
            ip += 1;
        }
        ip += 1;
        let mut i = 16;
        while vals[ip] >= 0 {
            self.piece_values[(WHITE + i) as usize] = vals[ip];
            self.piece_values[(BLACK + i) as usize] = vals[ip];
            i += 1;
            ip += 1;
        }
        ip += 1;
        let hand_section = ip;
        let mut i = 0;
        while vals[ip] >= 0 {
            self.hand_val[(WHITE + i) as usize] = vals[ip];
            self.hand_val[(BLACK + i) as usize] = vals[ip];
            i += 1;
            ip += 1;
        }

        // Thresholds for detecting material-losing repetition loops.
        self.pawn_gain = (2 * self.hand_val[WHITE as usize]).wrapping_shl(20);
        self.queen_gain = if variant != 0 {
            0
        } else {
            (2 * self.hand_val[(WHITE + 4) as usize]).wrapping_shl(20)
        };

        for i in 0..16usize {
            // Piece type after demotion (could be Pawn, in chess).
            let demoted = self.drop_type[self.hand_slot[WHITE as usize + i + 16] as usize] - 1;
            let gain = self.piece_values[WHITE as usize + i + 16] + self.hand_val[demoted as usize];
            self.hand_val[WHITE as usize + i + 16] = gain;
            self.hand_val[BLACK as usize + i + 16] = gain;
            self.hand_bulk[WHITE as usize + i] = self.piece_values[WHITE as usize + i] / 80;
            self.hand_bulk[BLACK as usize + i] = self.hand_bulk[WHITE as usize + i];
            let demoted_bulk = self.piece_values[demoted as usize] / 80;
            self.hand_bulk[WHITE as usize + i + 16] = demoted_bulk;
            self.hand_bulk[BLACK as usize + i + 16] = demoted_bulk;
        }
        for i in 0..16usize {
            // Gain by capturing the base piece.
            self.hand_val[WHITE as usize + i] += self.piece_values[WHITE as usize + i];
            self.hand_val[BLACK as usize + i] = self.hand_val[WHITE as usize + i];
        }

        // For same-color captures the piece does not flip color, so
        // the gain is just the in-hand bonus.
        let mut ip = hand_section;
        let mut i = 0;
        while vals[ip] >= 0 {
            self.hand_val_same[(WHITE + i) as usize] = vals[ip];
            self.hand_val_same[(BLACK + i) as usize] = vals[ip];
            i += 1;
            ip += 1;
        }
        for i in 0..16usize {
            let demoted = self.drop_type[self.hand_slot[WHITE as usize + i + 16] as usize] - 1;
            if demoted >= 0 && demoted < 96 {
                let v = self.piece_values[WHITE as usize + i + 16]
                    - self.piece_values[demoted as usize]
                    + self.hand_val_same[demoted as usize];
                self.hand_val_same[WHITE as usize + i + 16] = v;
                self.hand_val_same[BLACK as usize + i + 16] = v;
            }
            let g = self.piece_values[WHITE as usize + i + 16] - self.piece_values[demoted as usize];
            self.promo_gain_tab[WHITE as usize + i + 16 + 1] = g;
            self.promo_gain_tab[BLACK as usize + i + 16 + 1] = g;
        }
        for p in WHITE..COLOR {
            self.v_val[(p - WHITE) as usize] =
                (self.hand_val[p as usize] + self.piece_values[p as usize]) / 16;
            self.a_val[(p - WHITE) as usize] = self.hand_val[p as usize] / 64;
        }
        // The King counts as unpromoted (castling "promotes" it to an
        // unpromoted Rook).
        self.promo_gain_tab[(WHITE + ROYAL + 1) as usize] = 0;
        self.promo_gain_tab[(BLACK + ROYAL + 1) as usize] = 0;

        // Pawn bulk per color, and the drop entry at piece -1.
        let bulk = if variant == 0 {
            0 // no limit to Pawns per file in crazyhouse
        } else if self.nr_ranks == 7 {
            1
        } else {
            2
        };
        self.pawn_bulk_tab[(WHITE + 1) as usize] = bulk;
        self.pawn_bulk_tab[(BLACK + 1) as usize] = 4 * bulk;
        self.pawn_bulk_tab[0] = 0; // drops never leave a board file
    }

    fn init_pst(&mut self, desc: &VariantDesc, variant: usize) {
        let nf = self.nr_files;
        let nr = self.nr_ranks;
        let zone = self.zone;

        // Everything defaults to the all-zero table; the hand reads
        // the off-board part of the center table.
        for i in 0..98 {
            self.pst_base[i] = PST_ZERO;
        }
        self.pst_base[0] = PST_CENTER * PST_SQUARES;

        {
            let d = &mut self.pst_data;
            let base = PST_CENTER * PST_SQUARES;
            for r in 0..nr {
                for f in 0..nf {
                    let fr = f as f64 - nf as f64 / 2.0 + 0.5;
                    let rr = r as f64 - nr as f64 / 2.0 + 0.5;
                    d[base + (22 * r + f) as usize] = (8.0 - fr * fr - rr * rr) as i32;
                }
            }

            let pawn = PST_PAWN * PST_SQUARES;
            let king = PST_KING * PST_SQUARES;
            let knight = PST_KNIGHT * PST_SQUARES;
            let pv = self.piece_values[WHITE as usize];
            for f in 0..11i32 {
                let dd: i32 = if nr > 8 || nr == 7 { 1 } else { 0 }; // larger camp
                for r in 0..=zone {
                    // In and just before the zone ("7th rank").
                    d[pawn + (22 * (nr - 1 - r) + f) as usize] = (1.2 * pv as f64) as i32;
                    d[pawn + (22 * r + f + 11) as usize] = (1.2 * pv as f64) as i32;
                }
                d[pawn + (22 * (nr - 2 - zone) + f) as usize] = (0.6 * pv as f64) as i32;
                d[pawn + (22 * (zone + 1) + f + 11) as usize] = (0.6 * pv as f64) as i32;
                // Discourage leaving the second rank.
                d[pawn + (22 * (nr - 2) + f + 11) as usize] = 10;
                d[pawn + (22 + f) as usize] = 10;
                for r in 0..nr {
                    let v = d[pawn + (22 * r + f + 11) as usize] - ((r - nr / 2) * 3 + 10);
                    d[pawn + (22 * r + f + 11) as usize] = v;
                    d[pawn + (22 * (nr - 1 - r) + f) as usize] = v;
                }
                for r in (2 + dd)..(nr - 2 - dd) {
                    d[king + (22 * r + f) as usize] = -127;
                }
                d[king + f as usize] = 80;
                d[king + (22 * (nr - 1) + f) as usize] = 80;
                d[king + (22 * dd + f) as usize] = 90;
                d[king + (22 * (nr - 1 - dd) + f) as usize] = 90;
                for r in (2 + dd)..(nr - 2 - dd) {
                    d[king + (22 * r + f + 11) as usize] = -40;
                }
                // Only used for crazyhouse.
                d[knight + (22 * 3 + f) as usize] = 12;
                d[knight + (22 * 4 + 11 + f) as usize] = 12;
                d[knight + (22 * 4 + f) as usize] = 20;
                d[knight + (22 * 3 + 11 + f) as usize] = 20;
                d[knight + (22 * 5 + f) as usize] = 17;
                d[knight + (22 * 2 + 11 + f) as usize] = 17;
            }

            let general = PST_GENERAL * PST_SQUARES;
            let owl = PST_OWL * PST_SQUARES;
            let promo = PST_PROMO * PST_SQUARES;
            let rook = PST_ROOK * PST_SQUARES;
            for f in 0..nf {
                for r in 0..nr {
                    let xr = nr - 1 - r;
                    let mr = (nr as f64 - 1.0) / 2.0;
                    let mf = (nf as f64 - 1.0) / 2.0;
                    let g = ((r as f64 - mr) * 5.0
                        - r as f64 * (f as f64 - mf) * (f as f64 - mf))
                        as i32
                        + 10 * (xr < zone) as i32
                        - 20 * (xr == 0) as i32;
                    d[general + (22 * r + f) as usize] = g;
                    d[general + (22 * xr + f + 11) as usize] = g;
                    let o = (r == 1) as i32 * 10
                        + if xr < zone { 90 } else { -90 }
                        + 90 * (xr == zone) as i32;
                    d[owl + (22 * r + f) as usize] = o;
                    d[owl + (22 * xr + f + 11) as usize] = o;
                    let p = 90 * (xr < zone) as i32;
                    d[promo + (22 * r + f) as usize] = p;
                    d[promo + (22 * xr + f + 11) as usize] = p;
                    let rk = 45 * (xr < zone) as i32;
                    d[rook + (22 * r + f) as usize] = rk;
                    d[rook + (22 * xr + f + 11) as usize] = rk;
                }
            }
            if nr <= 6 {
                let v = d[general + (2 * 22 + 2 + 11) as usize] + 30;
                d[general + (2 * 22 + 2 + 11) as usize] = v;
                d[general + ((nr - 3) * 22 + nf - 3) as usize] = v;
                let v = d[king + (22 * (nr - 1) + nf - 1) as usize] + 30;
                d[king + (22 * (nr - 1) + nf - 1) as usize] = v;
                d[king + 0] = v;
                d[king + (2 * 22) as usize] = 0;
                d[king + (22 * (nr - 3) + nf - 1) as usize] = 0;
            }
        }

        // Hand values and drop bulk live at the hand slots of the
        // shared center/hand table. Type -1 occurs on all drops; the
        // true type is determined by the off-board square.
        let hand = PST_CENTER * PST_SQUARES;
        for i in 0..16usize {
            let v = self.hand_val[WHITE as usize + i] - 2 * self.piece_values[WHITE as usize + i];
            let ws = self.hand_slot[WHITE as usize + i] as usize;
            let bs = self.hand_slot[BLACK as usize + i] as usize;
            self.pst_data[hand + ws] = v;
            self.pst_data[hand + bs] = v;
            let b = self.piece_values[WHITE as usize + i] / 80;
            self.drop_bulk[ws] = b;
            self.drop_bulk[bs] = b;
        }

        // Table assignments. Bishops like the center; Pawns and the
        // King always get their tables, the rest per the variant map.
        self.pst_base[(WHITE + 2 + 1) as usize] = PST_CENTER * PST_SQUARES;
        self.pst_base[(BLACK + 2 + 1) as usize] = PST_CENTER * PST_SQUARES;
        self.pst_base[(WHITE + 1) as usize] = PST_PAWN * PST_SQUARES;
        self.pst_base[(BLACK + 1) as usize] = PST_PAWN * PST_SQUARES + 11;
        self.pst_base[(WHITE + ROYAL + 1) as usize] = PST_KING * PST_SQUARES;
        self.pst_base[(BLACK + ROYAL + 1) as usize] = PST_KING * PST_SQUARES;
        if variant == 0 {
            // Queens share the King's table, shifted to its black half.
            self.pst_base[(WHITE + 4 + 1) as usize] = PST_KING * PST_SQUARES + 11;
            self.pst_base[(BLACK + 4 + 1) as usize] = PST_KING * PST_SQUARES + 11;
        }
        let mut f = 0usize;
        for ch in desc.pst_map.chars() {
            if ch == ' ' {
                f = 15;
            } else {
                let tab = (ch as usize - '0' as usize) * PST_SQUARES;
                self.pst_base[WHITE as usize + f + 1] = tab;
                self.pst_base[BLACK as usize + f + 1] =
                    tab + if ch > '2' { 11 } else { 0 };
            }
            f += 1;
        }
    }

    /// Builds the capture-set membership map and the per-piece
    /// reachability codes.
    fn init_capture_codes(&mut self, codes: &[i8]) {
        let mut dir = 0;
        for i in 0..16 {
            let b = 1 << i;
            let range = if i >= 12 { i as i32 / 2 - 4 } else { 10 }; // 2 or 3 for the short sliders
            loop {
                let step = codes[dir] as i32;
                dir += 1;
                if step == 0 {
                    break;
                }
                if i < 8 {
                    self.capt_code[(step + VEC_ORIGIN) as usize] |= b;
                } else {
                    // Slides skip their first square, so a leap there
                    // can mask them.
                    for d in 2..(range + 1) {
                        self.capt_code[(d * step + VEC_ORIGIN) as usize] |= b;
                    }
                    for d in 1..11 {
                        self.delta_vec[(d * step + VEC_ORIGIN) as usize] = step;
                        self.dist_tab[(d * step + VEC_ORIGIN) as usize] = d;
                    }
                }
            }
        }
        // Collect, for each piece, the capture sets it fully covers.
        for piece in WHITE..(BLACK + 32) {
            let start = self.first_dir[(piece - WHITE) as usize];
            if start == 0 {
                continue;
            }
            let mut code = 0;
            let mut d = start;
            loop {
                let sd = self.steps[d];
                d += 1;
                if sd.delta == 0 {
                    break;
                }
                if sd.move_only {
                    continue;
                }
                let c = self.capt_code[(sd.delta + VEC_ORIGIN) as usize] & C_DISTANT;
                if c != 0 {
                    code |= c; // a jump excludes slides to the same square
                }
                for k in 1..(sd.range + 1) {
                    self.capt_code[(k * sd.delta + VEC_ORIGIN) as usize] ^= -1;
                }
            }
            for i in 0..VEC_SIZE {
                let c = self.capt_code[i];
                if c < 0 {
                    self.capt_code[i] ^= -1; // restore reachable squares
                } else {
                    code |= c; // sets containing unreachable squares
                }
            }
            self.piece_code[piece as usize] = code ^ 0xFFFF;
        }
    }
}

/// Unpacks the raw `(step, range)` pairs into structured descriptors,
/// preserving the pair indices the direction lists point at.
fn decode_steps() -> Vec<StepDescriptor> {
    let mut steps = Vec::with_capacity(STEPS.len() / 2);
    for pair in STEPS.chunks(2) {
        let delta = pair[0] as i32;
        let raw = pair[1] as i32;
        let sd = if raw & 48 == 48 {
            StepDescriptor {
                delta: delta,
                range: raw & 15,
                move_only: false,
                capt_only: true,
                has_double: false,
            }
        } else if raw & 32 != 0 {
            let r = raw & 15;
            StepDescriptor {
                delta: delta,
                range: if r == 2 { 1 } else { r },
                move_only: true,
                capt_only: false,
                has_double: r == 2,
            }
        } else {
            StepDescriptor {
                delta: delta,
                range: raw,
                move_only: false,
                capt_only: false,
                has_double: false,
            }
        };
        steps.push(sd);
    }
    steps
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::variant::find_variant;

    #[test]
    fn test_step_decode() {
        let steps = decode_steps();
        // White FIDE Pawn: move-only forward step with a double push.
        let fwd = steps[49];
        assert_eq!(fwd.delta, 22);
        assert!(fwd.move_only && fwd.has_double && fwd.range == 1);
        let diag = steps[50];
        assert!(diag.capt_only && diag.range == 1);
        // Queen run is eight unlimited sliders.
        for k in 0..8 {
            assert_eq!(steps[13 + k].range, 10);
        }
        assert_eq!(steps[13 + 8].delta, 0);
    }

    #[test]
    fn test_chess_capture_codes() {
        let t = Tables::new(find_variant("crazyhouse"));
        let knight = t.piece_code[(WHITE + 1) as usize];
        // A Knight reaches its leap set, and aligns with no slide.
        assert!(knight & t.capt(43) & C_CONTACT != 0);
        assert_eq!(knight & t.capt(3 * 22), 0);
        assert_eq!(knight & t.capt(66 + 3), 0);
        let rook = t.piece_code[(WHITE + 3) as usize];
        assert!(rook & t.capt(3 * 22) & C_DISTANT != 0);
        assert_eq!(rook & t.capt(23), 0);
        let queen = t.piece_code[(WHITE + 4) as usize];
        assert!(queen & t.capt(5) & C_DISTANT != 0);
        assert!(queen & t.capt(4 * 23) & C_DISTANT != 0);
        // Ray bookkeeping for a rook move three squares up.
        assert_eq!(t.delta(3 * 22), 22);
        assert_eq!(t.dist(3 * 22), 3);
    }

    #[test]
    fn test_special_decodes() {
        let t = Tables::new(find_variant("crazyhouse"));
        // White double push e2-e4 is encoded as rank 8.
        assert_eq!(t.to_decode[(8 * 22 + 4) as usize], 3 * 22 + 4);
        // Promotion encodings point back at the real square.
        assert_eq!(t.to_decode[(7 * 22 + 4 + 11) as usize], 7 * 22 + 4);
        assert_eq!(t.promo_inc[(7 * 22 + 4 + 11) as usize], 16);
        // Under-promotion ranks add the piece offset.
        assert_eq!(t.to_decode[(6 * 22 + 11 + 4) as usize], 7 * 22 + 4);
        assert_eq!(t.promo_inc[(6 * 22 + 11 + 4) as usize], 17);
        // K-side castle: Rook to f1, King to g1, Rook from h1.
        assert_eq!(t.to_decode[(8 * 22 + 10) as usize], 5);
        assert_eq!(t.drop_type[(8 * 22 + 10) as usize], 6);
        assert_eq!(t.zone_tab[(8 * 22 + 10) as usize], 7);
        assert_eq!(t.sqr2file[(8 * 22 + 10) as usize], 11);
    }

    #[test]
    fn test_zone_tab() {
        let t = Tables::new(find_variant("shogi"));
        // White's zone is the top three ranks, black's the bottom.
        assert!(t.zone_tab[(22 * 8 + 4) as usize] & WHITE != 0);
        assert!(t.zone_tab[(22 * 0 + 4) as usize] & BLACK != 0);
        assert_eq!(t.zone_tab[(22 * 4 + 4) as usize], 0);
        // The last rank carries the Z_LAST bit.
        assert!(t.zone_tab[(22 * 8 + 0) as usize] & Z_LAST != 0);
        assert!(t.zone_tab[(22 * 6 + 0) as usize] & Z_LAST == 0);
    }

    #[test]
    fn test_hand_slots() {
        let t = Tables::new(find_variant("shogi"));
        // A captured white Pawn lands in black's Pawn counter, and a
        // captured promoted Pawn demotes to the same slot.
        let slot = t.hand_slot[WHITE as usize];
        assert!(slot >= 11 && file(slot) >= 11);
        assert_eq!(t.hand_slot[(WHITE + 16) as usize], slot);
        assert_eq!(t.drop_type[slot as usize] - 1, BLACK);
        // Hand keys have their low 16 bits cleared.
        assert_eq!(t.hand_key[WHITE as usize] & 0xFFFF, 0);
        assert_eq!(t.key(-1, slot) & 0xFFFF, 0);
    }
}
