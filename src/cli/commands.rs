use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "pool-notifier")]
pub struct Opt {
    #[arg(long, global = true, help = "Path to a TOML config file")]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    #[command(name = "run", about = "Run the Telegram bot until interrupted")]
    Run {
        #[arg(
            long = "events-stdin",
            help = "Read JSON-lines notification events from stdin"
        )]
        events_stdin: bool,
    },
    #[command(
        name = "notify-block",
        about = "Notify subscribers of an address that a block was found"
    )]
    NotifyBlock {
        #[arg(help = "The payout address")]
        address: String,
        #[arg(help = "Height of the found block")]
        height: u64,
        #[arg(help = "Submission result, e.g. 'accepted'")]
        message: String,
        #[arg(long = "block-hash", help = "Hash of the found block")]
        block_hash: Option<String>,
    },
    #[command(
        name = "notify-best-diff",
        about = "Notify subscribers of an address about a new best difficulty"
    )]
    NotifyBestDiff {
        #[arg(help = "The payout address")]
        address: String,
        #[arg(help = "The new best difficulty")]
        difficulty: f64,
    },
    #[command(name = "subscriptions", about = "List chats subscribed to an address")]
    Subscriptions {
        #[arg(help = "The payout address")]
        address: String,
    },
    #[command(name = "validate", about = "Check whether an address is well formed")]
    Validate {
        #[arg(help = "The address to check")]
        address: String,
    },
}
