// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! `patsup`: a thin gRPC client for `patsupd`, the pattern process
//! supervisor daemon. Talks the same `PatternSupervisor` surface the daemon
//! serves — no policy lives here beyond argument parsing and output shaping.

mod client;
mod commands;
mod output;
mod view;

use clap::{Parser, Subcommand};
use output::OutputFormat;

#[derive(Parser)]
#[command(name = "patsup", version, about = "Control client for the patsupd supervisor")]
struct Cli {
    /// Address of the daemon's control plane, e.g. http://127.0.0.1:7600.
    #[arg(long, global = true, env = "PATSUP_ADDR", default_value = "http://127.0.0.1:7600")]
    addr: String,

    /// Output format.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Launch (or reuse) a process for a pattern.
    Launch {
        pattern_name: String,
        #[arg(long)]
        namespace: Option<String>,
        #[arg(long)]
        session_id: Option<String>,
        /// Overrides the pattern's manifest-declared isolation level for this
        /// launch; omit to use the pattern's default.
        #[arg(long)]
        isolation: Option<String>,
        /// Pattern-specific config as `key=value`; may be repeated.
        #[arg(long = "config", value_name = "KEY=VALUE")]
        config: Vec<String>,
    },
    /// Request a graceful stop, escalating to SIGKILL after the grace period.
    Terminate {
        process_id: String,
        #[arg(long)]
        grace_period_seconds: Option<u32>,
    },
    /// List process records, optionally filtered.
    List {
        #[arg(long)]
        pattern_name: Option<String>,
        #[arg(long)]
        isolation_level: Option<String>,
        #[arg(long)]
        state: Option<String>,
    },
    /// Show aggregate process health.
    Health {
        /// Include the full per-process list alongside the aggregate counts.
        #[arg(long)]
        processes: bool,
    },
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Launch { pattern_name, namespace, session_id, isolation, config } => {
            commands::launch::handle(
                &cli.addr,
                cli.output,
                &pattern_name,
                namespace,
                session_id,
                isolation,
                config,
            )
            .await
        }
        Command::Terminate { process_id, grace_period_seconds } => {
            commands::terminate::handle(&cli.addr, cli.output, &process_id, grace_period_seconds)
                .await
        }
        Command::List { pattern_name, isolation_level, state } => {
            commands::list::handle(&cli.addr, cli.output, pattern_name, isolation_level, state)
                .await
        }
        Command::Health { processes } => {
            commands::health::handle(&cli.addr, cli.output, processes).await
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(cli).await {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
