use std::process::exit;

use colored::Colorize;

fn main() {
    if let Err(e) = empdash::app::run_cli() {
        eprintln!("{} {e}", "error:".bold().red());
        exit(1);
    }
}
