use std::{
    path::{Path, PathBuf},
    process::ExitCode,
    time::Instant,
};

use clap::{error::ErrorKind, CommandFactory, Parser, Subcommand};
use rcompress::{compress, decompress, Config, HuffmanError};
use tracing_subscriber::EnvFilter;

const EXTENSION: &str = "huf";

const EXIT_NOT_FOUND: u8 = 1;
const EXIT_FAILURE: u8 = 3;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    // Command to execute
    #[command(subcommand)]
    command: Commands,

    /// Path of the input file
    #[arg(short, long, global = true)]
    input: Option<PathBuf>,

    /// Path of the output file, derived from the input when missing
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    Compress,
    Decompress,
}

fn compressed_path(input: &Path) -> PathBuf {
    let mut name = input.as_os_str().to_owned();
    name.push(".");
    name.push(EXTENSION);
    PathBuf::from(name)
}

fn decompressed_path(input: &Path) -> PathBuf {
    match input.extension() {
        Some(ext) if ext == EXTENSION => input.with_extension(""),
        _ => input.with_extension("out"),
    }
}

/// `--input` is global so it can follow the mode, which leaves clap unable to
/// require it.
fn required_input(input: Option<PathBuf>) -> Result<PathBuf, clap::Error> {
    input.ok_or_else(|| {
        Args::command().error(
            ErrorKind::MissingRequiredArgument,
            "the following required argument was not provided: --input <INPUT>",
        )
    })
}

fn run(args: Args, input: PathBuf) -> anyhow::Result<()> {
    let config = match &args.config {
        Some(path) => Config::new(path)?,
        None => Config::default(),
    };

    let start = Instant::now();
    match args.command {
        Commands::Compress => {
            let output = args.output.unwrap_or_else(|| compressed_path(&input));
            println!("compressing {}", input.display());
            let report = compress(&input, &output, &config)?;
            if config.report {
                println!("{}", report);
                println!(
                    "Compression time          : {:.2} ms",
                    start.elapsed().as_secs_f64() * 1000.0
                );
            }
        }
        Commands::Decompress => {
            let output = args.output.unwrap_or_else(|| decompressed_path(&input));
            println!("decompressing {}", input.display());
            let written = decompress(&input, &output, &config)?;
            if config.report {
                println!("Output size (in bits)     : {}", written * 8);
                println!(
                    "Decompression time        : {:.2} ms",
                    start.elapsed().as_secs_f64() * 1000.0
                );
            }
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // clap exits with status 2 on an unknown mode or a missing input
    let mut args = Args::parse();
    let input = match required_input(args.input.take()) {
        Ok(input) => input,
        Err(e) => e.exit(),
    };

    match run(args, input) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            match e.downcast_ref::<HuffmanError>() {
                Some(HuffmanError::MissingInputFile { .. }) => ExitCode::from(EXIT_NOT_FOUND),
                _ => ExitCode::from(EXIT_FAILURE),
            }
        }
    }
}
