//! The XBoard protocol driver: a line-based loop that mutates the
//! engine state and kicks off a search whenever it is the engine's
//! turn. Diagnostic output goes out as `#` comment lines, which the
//! GUI ignores.

use std::io;
use std::io::{BufRead, Write};
use std::process::exit;
use std::time::{SystemTime, UNIX_EPOCH};

use regex::Regex;

use crate::basetypes::*;
use crate::engine::Engine;
use crate::moves::INVALID;
use crate::notation::{move_to_text, parse_move, write_fen};
use crate::variant::VARIANTS;

const NONE: i32 = 0;
const ANALYZE: i32 = 1;

pub fn run() -> io::Result<()> {
    let mut eng = Engine::new();
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        io::stdout().flush()?;
        if eng.pos.stm == eng.engine_side {
            think_and_move(&mut eng);
            io::stdout().flush()?;
        }
        let line = match lines.next() {
            Some(Ok(line)) => line,
            _ => return Ok(()), // EOF terminates
        };
        if !do_command(&mut eng, &line) {
            return Ok(());
        }
    }
}

fn think_and_move(eng: &mut Engine) {
    let (mv, score) = eng.think();
    if mv.is_invalid() {
        // No move: the game apparently ended.
        eng.engine_side = NONE;
        print_result(eng.pos.stm, score);
    } else {
        eng.root_make(mv);
        println!("move {}", move_to_text(&eng.tab, mv));
    }
}

fn print_result(stm: Color, score: Value) {
    if score == 0 {
        println!("1/2-1/2");
    } else if (score > 0) == (stm == WHITE) {
        println!("1-0");
    } else {
        println!("0-1");
    }
}

/// Handles one command line. Returns `false` to terminate.
fn do_command(eng: &mut Engine, line: &str) -> bool {
    lazy_static! {
        static ref LEVEL: Regex = Regex::new(r"^(\d+)\s+(\d+)(?::(\d+))?\s+(\d+)").unwrap();
        static ref OPTION: Regex = Regex::new(r"^(\w+)=(-?\d+)").unwrap();
    }
    let mut words = line.split_whitespace();
    let command = match words.next() {
        Some(c) => c,
        None => return true,
    };
    let arg = || line.splitn(2, char::is_whitespace).nth(1).unwrap_or("").trim();

    match command {
        "quit" => return false,
        "otim" => {} // our move will follow immediately
        "time" => {
            if let Some(t) = words.next().and_then(|w| w.parse().ok()) {
                eng.time_left = t;
            }
        }
        "easy" => eng.ponder = false,
        "hard" => eng.ponder = true,
        "post" => eng.post = true,
        "nopost" => eng.post = false,
        "random" => eng.randomize = true,
        "." => {} // periodic update request
        "option" => {
            if let Some(c) = OPTION.captures(arg()) {
                let value: i32 = c[2].parse().unwrap_or(0);
                match &c[1] {
                    "Resign" => eng.resign = value,
                    "Contempt" => eng.contempt = value,
                    _ => {}
                }
            }
        }
        "force" | "exit" => eng.engine_side = NONE,
        "analyze" => eng.engine_side = ANALYZE,
        "level" => {
            if let Some(c) = LEVEL.captures(arg()) {
                eng.mps = c[1].parse().unwrap_or(40);
                let min: i32 = c[2].parse().unwrap_or(5);
                let sec: i32 = c.get(3).map_or(0, |s| s.as_str().parse().unwrap_or(0));
                eng.inc = c[4].parse().unwrap_or(0);
                eng.time_control = 60 * min + sec;
                eng.time_per_move = -1;
            }
        }
        "protover" => {
            println!(
                "feature ping=1 setboard=1 colors=0 usermove=1 memory=1 debug=1 \
                 reuse=0 sigint=0 sigterm=0 myname=\"Diogenes 0.1\""
            );
            println!(
                "feature variants=\"crazyhouse,shogi,minishogi,judkinshogi,torishogi,\
                 crazywa,5x5+5_shogi,6x6+6_shogi,7x7+6_shogi,11x17+16_chu\""
            );
            println!("feature option=\"Resign -check 0\"");
            println!("feature option=\"Contempt -spin 0 -200 200\"");
            println!("feature done=1");
        }
        "sd" => {
            if let Some(d) = words.next().and_then(|w| w.parse().ok()) {
                eng.max_depth = d;
            }
        }
        "st" => {
            if let Some(t) = words.next().and_then(|w| w.parse().ok()) {
                eng.time_per_move = t;
            }
        }
        "memory" => {
            let n = words.next().and_then(|w| w.parse().ok()).unwrap_or(1);
            if !eng.tt.resize(n) {
                println!("tellusererror Not enough memory");
                exit(2);
            }
        }
        "ping" => println!("pong {}", arg()),
        "new" => {
            eng.engine_side = BLACK;
            eng.max_depth = MAX_PLY - 2;
            eng.randomize = false;
            eng.ran_key = tick_count() | 0x1001;
            let fen = eng.tab.start_fen;
            eng.set_board(Some(fen));
        }
        "variant" => {
            eng.set_variant(arg());
            announce_setup(eng);
        }
        "setboard" => {
            eng.engine_side = NONE;
            eng.set_board(Some(arg()));
        }
        "undo" => eng.take_back(1),
        "remove" => eng.take_back(2),
        "go" => eng.engine_side = eng.pos.stm,
        "hint" => {
            if !eng.ponder_move.is_invalid() {
                println!("Hint: {}", move_to_text(&eng.tab, eng.ponder_move));
            }
        }
        "b" => println!("# {}", write_fen(&eng.tab, &eng.pos)),
        "usermove" => {
            let stm = eng.pos.stm;
            match parse_move(&eng.tab, &eng.pos, stm, arg()) {
                Some(mv) if eng.root_make(mv) => {
                    eng.ponder_move = INVALID;
                }
                _ => println!("Illegal move"),
            }
        }
        // Completely ignored commands.
        "book" | "xboard" | "computer" | "name" | "ics" | "accepted" | "rejected" | "?" => {}
        _ => println!("Error: unknown command"),
    }
    true
}

/// Tells the GUI how to draw a board it does not know natively.
fn announce_setup(eng: &Engine) {
    let desc = &VARIANTS[eng.tab.variant];
    if let Some((ptc, betza)) = eng.tab.setup {
        print!(
            "setup ({}) {}x{}+{}_{} {} 0 1",
            ptc, desc.files, desc.ranks, desc.hand, eng.tab.tag, eng.tab.start_fen
        );
        for c in betza.chars() {
            if c == ',' {
                print!("\npiece ");
            } else {
                print!("{}", c);
            }
        }
        println!();
    }
}

fn tick_count() -> i32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos() as i32 ^ d.as_secs() as i32)
        .unwrap_or(1)
}
