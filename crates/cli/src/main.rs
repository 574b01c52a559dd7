//! # block-cli - Block Inspection Shell
//!
//! A REPL over the block codec. Writes accumulate in a memtable, `SEAL`
//! writes them out as one internal-key block, and `OPEN` loads a block file
//! back for scans, seeks and snapshot reads. Reads commands from stdin and
//! prints results to stdout, so it can be driven by a pipe as well as by
//! hand. Logs go to stderr, filtered by `RUST_LOG`.
//!
//! ## Commands
//!
//! ```text
//! PUT key seq value   Buffer a value for key at sequence number seq
//! DEL key seq         Buffer a tombstone for key at seq
//! SEAL path           Write the buffered entries to path as one block
//! OPEN path           Load a block file
//! SCAN                Print every entry of the open block
//! SEEK key [seq]      Print the first entry at or after key@seq
//! GET key [seq]       Newest version of key visible at seq
//! STATS               Print memtable and block info
//! EXIT / QUIT         Leave the shell
//! ```
//!
//! `seq` defaults to the largest sequence number.
//!
//! ## Configuration
//!
//! ```text
//! BLOCK_RESTART_INTERVAL  records between restart points  (default: 16)
//! BLOCK_SIZE_KB           soft block size target in KiB   (default: 4)
//! RUST_LOG                log filter                      (default: "warn")
//! ```
//!
//! ## Example
//!
//! ```text
//! $ cargo run -p block-cli
//! > PUT k1 3 old
//! OK
//! > PUT k1 5 new
//! OK
//! > SEAL /tmp/k.blk
//! OK (2 entries, 32 bytes)
//! > OPEN /tmp/k.blk
//! OK (32 bytes, 1 restarts)
//! > GET k1 4
//! old
//! > EXIT
//! bye
//! ```

mod shell;

use std::io::{self, BufRead, Write};

use anyhow::Result;
use config::BlockConfig;
use shell::{Reply, Shell};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let config = BlockConfig::from_env();
    let mut shell = Shell::new(config);

    println!(
        "block-cli started (restart_interval={}, block_size={}KiB)",
        config.restart_interval,
        config.block_size / 1024
    );
    println!("Commands: PUT key seq value | DEL key seq | SEAL path | OPEN path");
    println!("          SCAN | SEEK key [seq] | GET key [seq] | STATS | EXIT");
    print!("> ");
    io::stdout().flush().ok();

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        match shell.execute(&line) {
            Ok(Reply::Lines(lines)) => {
                for l in lines {
                    println!("{l}");
                }
            }
            Ok(Reply::Exit) => {
                println!("bye");
                break;
            }
            Err(e) => println!("ERR {e:#}"),
        }

        print!("> ");
        io::stdout().flush().ok();
    }

    Ok(())
}
