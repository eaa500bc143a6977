// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! influx-bridge CLI
//!
//! Builds InfluxDB request descriptors from JSON messages.
//!
//! # Usage
//!
//! ```bash
//! # Write an example configuration
//! influx-bridge gen-config --output bridge.yaml
//!
//! # Check a configuration file
//! influx-bridge validate --config bridge.yaml
//!
//! # Build a query descriptor from a message on stdin
//! echo '{"timeSpan": 60}' | influx-bridge query --config bridge.yaml --node cpu-recent
//!
//! # Build a write descriptor from a message file
//! influx-bridge write --config bridge.yaml --node ingest --input msg.json
//!
//! # Validate Line Protocol records, one per line
//! influx-bridge check-lines --input records.lp
//! ```

use clap::{Parser, Subcommand};
use influx_bridge::{line_protocol, BridgeConfig, Message, Pipeline};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// InfluxDB request builder
#[derive(Parser, Debug)]
#[command(name = "influx-bridge")]
#[command(about = "InfluxDB v2/v3 request builder and Line Protocol filter")]
#[command(version)]
struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build a query descriptor for a message
    Query {
        /// Configuration file path
        #[arg(short, long)]
        config: PathBuf,

        /// Query node name
        #[arg(short, long)]
        node: String,

        /// Message file (JSON object); stdin when omitted
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Build a write descriptor for a message
    Write {
        /// Configuration file path
        #[arg(short, long)]
        config: PathBuf,

        /// Write node name
        #[arg(short, long)]
        node: String,

        /// Message file (JSON object); stdin when omitted
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Validate Line Protocol records, one per line
    CheckLines {
        /// Records file; stdin when omitted
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Validate a configuration file
    Validate {
        /// Configuration file path
        #[arg(short, long)]
        config: PathBuf,
    },

    /// Generate example configuration file
    GenConfig {
        /// Output file path
        #[arg(short, long, default_value = "influx-bridge.yaml")]
        output: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Logs go to stderr; stdout carries JSON.
    let filter = EnvFilter::try_new(&args.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    match args.command {
        Commands::Query {
            config,
            node,
            input,
        } => {
            let config = BridgeConfig::from_file(&config)?;
            let node = config.query_node(&node, &config.registry())?;
            run_node(&node, input.as_deref())
        }
        Commands::Write {
            config,
            node,
            input,
        } => {
            let config = BridgeConfig::from_file(&config)?;
            let node = config.write_node(&node, &config.registry())?;
            run_node(&node, input.as_deref())
        }
        Commands::CheckLines { input } => cmd_check_lines(input.as_deref()),
        Commands::Validate { config } => cmd_validate(config),
        Commands::GenConfig { output } => cmd_gen_config(output),
    }
}

fn read_input(path: Option<&Path>) -> io::Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path),
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

fn run_node(node: &dyn Pipeline, input: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let msg = Message::from_json(&read_input(input)?)?;
    let out = node.handle(msg)?;
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

fn cmd_check_lines(input: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let content = read_input(input)?;
    let mut failed = 0usize;
    let mut total = 0usize;

    for (i, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        total += 1;
        match line_protocol::validate(line) {
            Ok(_) => println!("{:>5}  ok       {}", i + 1, line),
            Err(e) => {
                failed += 1;
                println!("{:>5}  invalid  {} ({})", i + 1, line, e);
            }
        }
    }

    println!();
    println!("{} line(s) checked, {} invalid", total, failed);
    if failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}

fn cmd_validate(config_path: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    match BridgeConfig::from_file(&config_path) {
        Ok(config) => {
            println!("Configuration valid!");
            println!();
            println!("Profiles: {}", config.profiles.len());
            for (name, profile) in &config.profiles {
                let p = &profile.connection;
                println!(
                    "  {} -> {} (InfluxDB {}, database '{}'{})",
                    name,
                    p.base_url(),
                    p.version,
                    p.database,
                    if p.token.trim().is_empty() {
                        ", NO TOKEN"
                    } else {
                        ""
                    }
                );
            }
            println!("Queries: {}", config.queries.len());
            for q in &config.queries {
                println!("  [{}] {} on '{}'", q.name, q.settings.table, q.profile);
            }
            println!("Writers: {}", config.writers.len());
            for w in &config.writers {
                println!("  [{}] on '{}'", w.name, w.profile);
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("Configuration invalid: {}", e);
            std::process::exit(1);
        }
    }
}

fn cmd_gen_config(output: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let yaml = BridgeConfig::example().to_yaml()?;

    let content = format!(
        r#"# influx-bridge configuration
# Generated by influx-bridge gen-config
#
# Tokens are read from the environment variables named by token_env.
# A literal `token:` entry may be used instead.

{}"#,
        yaml
    );

    std::fs::write(&output, content)?;
    println!("Generated configuration file: {}", output.display());
    Ok(())
}
