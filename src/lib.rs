//! An XBoard-compatible engine for chess variants with piece drops:
//! crazyhouse, the small and full Shogi boards, Tori Shogi, and the
//! 11x11 Wa variants, over one variant-parameterized board model.

#[macro_use]
extern crate lazy_static;
extern crate rand;
extern crate regex;

pub mod basetypes;
pub mod moves;
pub mod variant;
pub mod tables;
pub mod position;
pub mod engine;
pub mod movegen;
pub mod evaluate;
pub mod tt;
pub mod search;
pub mod notation;
pub mod xboard;
