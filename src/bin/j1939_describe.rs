//! Thin CLI front-end: loads a Digital Annex, parses a candump log (file
//! or stdin), and prints one JSON object per emitted description. Carries
//! none of the decoding logic itself — that all lives in the library.
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use j1939_describe::{candump, Describer, Dictionary};

/// Decode SAE J1939 candump traffic against a Digital Annex dictionary.
#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// Path to the Digital Annex JSON document.
    da: PathBuf,

    /// Path to a candump log file; reads stdin if omitted.
    log: Option<PathBuf>,

    /// Omit the PGN/DA/SA identification block.
    #[arg(long)]
    no_pgns: bool,

    /// Omit per-SPN decoding.
    #[arg(long)]
    no_spns: bool,

    /// Don't describe transport control/data frames at the link layer.
    #[arg(long)]
    no_link_layer: bool,

    /// Don't reassemble or describe BAM/RTS-CTS transport sessions.
    #[arg(long)]
    no_transport_layer: bool,

    /// Append the full reassembled payload as a bit-string on completion.
    #[arg(long)]
    include_transport_rawdata: bool,

    /// Emit "N/A" for not-available SPNs instead of suppressing them.
    #[arg(long)]
    include_na: bool,

    /// Emit a transport-session view after every TP.DT instead of only on completion.
    #[arg(long)]
    real_time: bool,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let dictionary = match Dictionary::from_path(&cli.da) {
        Ok(dictionary) => dictionary,
        Err(err) => {
            eprintln!("failed to load Digital Annex {}: {err}", cli.da.display());
            return ExitCode::FAILURE;
        }
    };

    let config = j1939_describe::DescriberConfig {
        describe_pgns: !cli.no_pgns,
        describe_spns: !cli.no_spns,
        describe_link_layer: !cli.no_link_layer,
        describe_transport_layer: !cli.no_transport_layer,
        include_transport_rawdata: cli.include_transport_rawdata,
        include_na: cli.include_na,
        real_time: cli.real_time,
    };
    let mut describer = Describer::new(&dictionary, config);

    let reader: Box<dyn BufRead> = match &cli.log {
        Some(path) => match File::open(path) {
            Ok(file) => Box::new(BufReader::new(file)),
            Err(err) => {
                eprintln!("failed to open {}: {err}", path.display());
                return ExitCode::FAILURE;
            }
        },
        None => Box::new(BufReader::new(io::stdin())),
    };

    for (id, data) in candump::parse_reader(reader) {
        for description in describer.describe_frame(id, &data) {
            if description.is_empty() {
                continue;
            }
            println!("{}", serde_json::Value::Object(description));
        }
    }

    ExitCode::SUCCESS
}
