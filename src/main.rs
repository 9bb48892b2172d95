extern crate diogenes;

use std::process::exit;

fn main() {
    exit(match diogenes::xboard::run() {
        Ok(_) => 0,
        Err(_) => 1,
    })
}
