//! Compare two saved listing pages and print one line per change.
//!
//! Usage: listing-diff <file-a> <file-b>
//!
//! Output format is `<kind> <filename>` with kind N (new), D (deleted) or
//! M (modified), one line per change in name order.

use std::fs;
use std::process::ExitCode;

use mirror_core::{diff_inventories, parse_inventory, FileInfo};
use mirror_engine::decode_page;

fn read_inventory(path: &str) -> Result<Vec<FileInfo>, String> {
    let bytes = fs::read(path).map_err(|err| format!("{path}: {err}"))?;
    let html = decode_page(&bytes, None).map_err(|err| format!("{path}: {err}"))?;
    parse_inventory(&html).map_err(|err| format!("{path}: {err}"))
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() != 2 {
        eprintln!("Error: Give two files!");
        return ExitCode::from(1);
    }

    let (a, b) = match (read_inventory(&args[0]), read_inventory(&args[1])) {
        (Ok(a), Ok(b)) => (a, b),
        (Err(err), _) | (_, Err(err)) => {
            eprintln!("Error: {err}");
            return ExitCode::from(1);
        }
    };

    for entry in diff_inventories(&a, &b) {
        println!("{} {}", entry.change.code(), entry.name);
    }
    ExitCode::SUCCESS
}
