use clap::{Parser, Subcommand};
use spindle::protocol::{Reply, Request, SOCKET_PATH};
use spindle::{FixedCadence, Label, SegmentModel, SpinEngine, Wheel};
use std::io::{BufRead, BufReader, Write};
use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "spindle", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Control socket of the running whirl daemon
    #[arg(short = 's', long, default_value = SOCKET_PATH)]
    socket: PathBuf,
}

#[derive(Subcommand, Debug, Clone)]
enum Commands {
    /// Spin the wheel.
    Spin {
        /// Block until the wheel settles and print the winner
        #[arg(short = 'w', long)]
        wait: bool,
    },
    /// Stop the current spin without a winner.
    Cancel,
    /// Add an entry to the wheel.
    Add { label: String },
    /// Remove the entry at the given position.
    Remove { index: usize },
    /// List the entries on the wheel.
    List,
    /// Show the spin state and last winner.
    Status,
    /// Spin a throwaway wheel locally, without a daemon.
    Roll {
        /// Entries to put on the wheel
        #[arg(required = true)]
        labels: Vec<String>,

        /// Seed for a reproducible spin
        #[arg(long)]
        seed: Option<u64>,

        /// Simulated frame length in milliseconds
        #[arg(long, default_value_t = 1000.0 / 60.0)]
        frame_ms: f64,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let request = match cli.command {
        Commands::Spin { wait } => Request::Spin { wait },
        Commands::Cancel => Request::Cancel,
        Commands::Add { label } => Request::Add(Label::parse(&label)?.to_string()),
        Commands::Remove { index } => Request::Remove(index),
        Commands::List => Request::List,
        Commands::Status => Request::Status,
        Commands::Roll {
            labels,
            seed,
            frame_ms,
        } => return roll(labels, seed, frame_ms),
    };

    let reply = send_request(&cli.socket, &request)?;
    if reply.is_error() {
        anyhow::bail!("{}", reply);
    }
    println!("{}", reply);
    Ok(())
}

fn roll(labels: Vec<String>, seed: Option<u64>, frame_ms: f64) -> anyhow::Result<()> {
    if !(frame_ms > 0.0) {
        anyhow::bail!("--frame-ms must be positive, got {}", frame_ms);
    }

    let engine = match seed {
        Some(seed) => SpinEngine::seeded(seed),
        None => SpinEngine::new(),
    };
    let mut wheel = Wheel::with_engine(SegmentModel::from_labels(&labels), engine);
    log::debug!("{}", wheel.stats());

    let index = wheel.roll(&mut FixedCadence::new(0.0, frame_ms))?;
    let winner = wheel
        .entries()
        .get(index)
        .ok_or_else(|| anyhow::anyhow!("winning index {} has no entry", index))?;
    println!("Winner: {}", winner);
    Ok(())
}

fn send_request(socket: &Path, request: &Request) -> anyhow::Result<Reply> {
    let mut stream = UnixStream::connect(socket).map_err(|e| {
        anyhow::anyhow!(
            "Failed to connect to whirl daemon at {}: {}. Is whirl running?",
            socket.display(),
            e
        )
    })?;

    writeln!(stream, "{}", request)?;

    let mut line = String::new();
    BufReader::new(&stream).read_line(&mut line)?;
    if line.trim().is_empty() {
        anyhow::bail!("whirl closed the connection without replying");
    }
    Ok(Reply::from_line(&line)?)
}
