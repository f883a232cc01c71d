//! colwire CLI Client
//!
//! Command-line query client: dials the server, runs a query over the
//! native protocol, and prints the result rows.

use std::net::TcpStream;

use clap::{Parser, Subcommand};
use colwire::{Block, ClientOptions, Column, Session};
use tracing_subscriber::{fmt, EnvFilter};

/// colwire CLI
#[derive(Parser, Debug)]
#[command(name = "colwire-cli")]
#[command(about = "Query client for columnar database servers")]
#[command(version)]
struct Args {
    /// Server hostname
    #[arg(long, default_value = "localhost")]
    host: String,

    /// Server native-protocol port
    #[arg(short, long, default_value = "9000")]
    port: u16,

    /// User to authenticate as
    #[arg(short, long, default_value = "default")]
    user: String,

    /// Password
    #[arg(long, default_value = "")]
    password: String,

    /// Database to use
    #[arg(short, long, default_value = "system")]
    database: String,

    /// Receive buffer size in KB
    #[arg(long, default_value = "64")]
    buffer_kb: usize,

    /// Number of pooled receive buffers
    #[arg(long, default_value = "2")]
    buffers: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a query and print the result rows
    Query {
        /// The query text to execute
        sql: String,
    },
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,colwire=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    let args = Args::parse();

    tracing::info!("colwire CLI v{}", colwire::VERSION);

    let options = ClientOptions::builder()
        .host(args.host)
        .port(args.port)
        .username(args.user)
        .password(args.password)
        .database(args.database)
        .receive_buffer_size(args.buffer_kb * 1024)
        .receive_buffer_count(args.buffers)
        .build();

    match args.command {
        Commands::Query { sql } => {
            if let Err(err) = run_query(&options, &sql) {
                tracing::error!("Query failed: {}", err);
                std::process::exit(1);
            }
        }
    }
}

fn run_query(options: &ClientOptions, sql: &str) -> colwire::Result<()> {
    let addr = format!("{}:{}", options.host, options.port);
    tracing::info!("Connecting to {}", addr);

    let stream = TcpStream::connect(&addr)?;
    let mut session = Session::connect(stream, options.clone())?;

    if let Some(info) = session.server_info() {
        tracing::info!(
            "Connected to {} {}.{} (revision {})",
            info.name,
            info.version_major,
            info.version_minor,
            info.revision
        );
    }

    let blocks = session.query(sql)?;

    let mut header_printed = false;
    let mut shown = 0u64;
    for block in &blocks {
        shown += print_block(block, &mut header_printed);
    }

    let progress = session.progress();
    tracing::info!(
        "Done: {} rows shown, {} rows / {} bytes processed server-side",
        shown,
        progress.rows,
        progress.bytes
    );
    Ok(())
}

/// Print one block as tab-separated rows, emitting the header once.
fn print_block(block: &Block, header_printed: &mut bool) -> u64 {
    if block.row_count() == 0 {
        return 0;
    }

    if !*header_printed {
        let header: Vec<String> = block
            .columns()
            .map(|(name, type_name, _)| format!("{} ({})", name, type_name))
            .collect();
        println!("{}", header.join("\t"));
        *header_printed = true;
    }

    for row in 0..block.row_count() as usize {
        let cells: Vec<String> = block
            .columns()
            .map(|(_, type_name, column)| cell_text(column, type_name, row))
            .collect();
        println!("{}", cells.join("\t"));
    }
    block.row_count()
}

/// Render one cell, interpreting numerics by their wire type name.
fn cell_text(column: &Column, type_name: &str, row: usize) -> String {
    match column {
        Column::Numeric(c) => {
            let rendered = if type_name.starts_with("Int") {
                c.i64_at(row).map(|v| v.to_string())
            } else if type_name.starts_with("Float") {
                c.f64_at(row).map(|v| v.to_string())
            } else {
                c.u64_at(row).map(|v| v.to_string())
            };
            rendered.unwrap_or_else(|| "?".to_string())
        }
        Column::String(c) => c
            .at(row)
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
            .unwrap_or_default(),
        Column::FixedString(c) => c
            .at(row)
            .map(|bytes| {
                let end = bytes
                    .iter()
                    .rposition(|&b| b != 0)
                    .map_or(0, |i| i + 1);
                String::from_utf8_lossy(&bytes[..end]).into_owned()
            })
            .unwrap_or_default(),
    }
}
