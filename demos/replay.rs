//! Replay a command log and print the resulting book.
//!
//! Reads JSON lines (one command per line) from the file given as the first
//! argument, or from stdin if none is given. Unlike `Journal::replay`, a
//! rejected command is logged and skipped so hand-written logs can be
//! explored.
//!
//! # Running
//!
//! ```bash
//! printf '%s\n' \
//!   '{"type":"send","order_id":1,"side":"sell","price":3,"size":1}' \
//!   '{"type":"send","order_id":2,"side":"buy","price":4,"size":6}' \
//!   | RUST_LOG=exchange_core=debug cargo run --example replay
//! ```

use std::fs::File;
use std::io::{self, BufRead, BufReader};

use exchange_core::{Config, Exchange, Journal, Side};

const DEPTH: usize = 5;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing for debug output
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("exchange_core=info".parse()?),
        )
        .init();

    let reader: Box<dyn BufRead> = match std::env::args().nth(1) {
        Some(path) => Box::new(BufReader::new(File::open(path)?)),
        None => Box::new(BufReader::new(io::stdin())),
    };
    let journal = Journal::read_json_lines(reader)?;

    let mut exchange = Exchange::with_config(Config::new().with_capacity(journal.len()));
    let mut fills = 0;
    let mut rejected = 0;

    for command in journal.entries() {
        match exchange.apply(command) {
            Ok(Some(exec)) => {
                for fill in &exec.fills {
                    println!(
                        "FILL maker={} taker={} {} @ {}",
                        fill.maker_order_id, fill.taker_order_id, fill.size, fill.price
                    );
                }
                fills += exec.fills.len();
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(order_id = command.order_id(), "skipping command: {}", e);
                rejected += 1;
            }
        }
    }

    println!();
    println!(
        "{} commands, {} fills, {} rejected, {} resting",
        journal.len(),
        fills,
        rejected,
        exchange.len()
    );
    println!("{:>10} | {:>10}", "BID", "ASK");

    let bids = exchange.depth(Side::Buy, DEPTH);
    let asks = exchange.depth(Side::Sell, DEPTH);
    for i in 0..bids.len().max(asks.len()) {
        let cell = |level: Option<&(i32, i64)>| {
            level.map_or_else(String::new, |(price, size)| format!("{}@{}", size, price))
        };
        println!("{:>10} | {:>10}", cell(bids.get(i)), cell(asks.get(i)));
    }

    if exchange.is_crossed() {
        println!("(book is crossed)");
    }

    Ok(())
}
