//! Command line front end for the G.711/G.726 compliance harness.

use std::path::PathBuf;
use std::process;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use g7xx::g711::G711Mode;
use g7xx::g726::{G726Packing, G726Rate};
use tracing::error;

use g7xx_compliance::audio::TelephonyWriter;
use g7xx_compliance::codec::Reference;
use g7xx_compliance::error::Result;
use g7xx_compliance::logging::{self, LogLevel};
use g7xx_compliance::pipeline::{G711Pipeline, G711PipelineMode, G726Pipeline};
use g7xx_compliance::suite::{Checks, ComplianceSuite};

const G711_IN_FILE: &str = "male_g711.wav";
const G711_ENCODED_FILE: &str = "g711.g711";
const G711_OUT_FILE: &str = "male_output_g711.wav";
const G726_IN_FILE: &str = "male.wav";
const G726_OUT_FILE: &str = "male_g726_16.wav";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// More output (repeat for more)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Errors only
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the G.711 compliance checks against the reference codec
    Compliance {
        /// Record the decoded sweeps and reference tones to this WAV file
        #[arg(long)]
        log_audio: Option<PathBuf>,

        /// Checks to leave out
        #[arg(long, value_enum)]
        skip: Vec<CheckArg>,
    },
    /// Push a WAV file through G.711
    G711 {
        /// Use A-law (default)
        #[arg(short = 'a', long, conflicts_with = "ulaw")]
        alaw: bool,

        /// Use u-law
        #[arg(short = 'u', long)]
        ulaw: bool,

        /// Encode only: WAV in, raw codes out
        #[arg(short = 'e', long, conflicts_with = "decode_only")]
        encode_only: bool,

        /// Decode only: raw codes in, WAV out
        #[arg(short = 'd', long)]
        decode_only: bool,

        /// Transcode to the other law between encoding and decoding
        #[arg(long)]
        transcode: bool,

        #[arg(short, long)]
        input: Option<PathBuf>,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Push a WAV file through G.726
    G726 {
        /// Bit rate in bits per second (16000, 24000, 32000 or 40000)
        #[arg(long, default_value_t = 16000)]
        rate: u32,

        #[arg(long, value_enum, default_value_t = PackingArg::None)]
        packing: PackingArg,

        #[arg(short, long, default_value = G726_IN_FILE)]
        input: PathBuf,

        #[arg(short, long, default_value = G726_OUT_FILE)]
        output: PathBuf,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum CheckArg {
    Accuracy,
    Idempotence,
    ReferencePower,
    Transcoding,
    Block,
}

impl From<CheckArg> for Checks {
    fn from(check: CheckArg) -> Self {
        match check {
            CheckArg::Accuracy => Checks::ACCURACY,
            CheckArg::Idempotence => Checks::IDEMPOTENCE,
            CheckArg::ReferencePower => Checks::REFERENCE_POWER,
            CheckArg::Transcoding => Checks::TRANSCODING,
            CheckArg::Block => Checks::BLOCK,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum PackingArg {
    None,
    Left,
    Right,
}

impl From<PackingArg> for G726Packing {
    fn from(packing: PackingArg) -> Self {
        match packing {
            PackingArg::None => G726Packing::None,
            PackingArg::Left => G726Packing::Left,
            PackingArg::Right => G726Packing::Right,
        }
    }
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::Compliance { log_audio, skip } => {
            let checks = skip
                .into_iter()
                .fold(Checks::all(), |checks, check| checks.difference(check.into()));
            let mut suite = ComplianceSuite::new(checks);
            if let Some(path) = log_audio {
                suite = suite.with_audio_log(TelephonyWriter::create(path)?);
            }
            suite.run(&Reference)?;
        }
        Command::G711 {
            alaw: _,
            ulaw,
            encode_only,
            decode_only,
            transcode,
            input,
            output,
        } => {
            let mode = if encode_only {
                G711PipelineMode::EncodeOnly
            } else if decode_only {
                G711PipelineMode::DecodeOnly
            } else {
                G711PipelineMode::EncodeDecode
            };
            let input = input.unwrap_or_else(|| match mode {
                G711PipelineMode::DecodeOnly => G711_ENCODED_FILE.into(),
                _ => G711_IN_FILE.into(),
            });
            let output = output.unwrap_or_else(|| match mode {
                G711PipelineMode::EncodeOnly => G711_ENCODED_FILE.into(),
                _ => G711_OUT_FILE.into(),
            });
            let pipeline = G711Pipeline {
                law: if ulaw { G711Mode::ULaw } else { G711Mode::ALaw },
                mode,
                transcode,
            };
            pipeline.run(&Reference, input, output)?;
        }
        Command::G726 {
            rate,
            packing,
            input,
            output,
        } => {
            let pipeline = G726Pipeline::new(G726Rate::try_from(rate)?, packing.into());
            pipeline.run(&Reference, input, output)?;
        }
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init(LogLevel::from_verbosity(cli.verbose, cli.quiet)) {
        eprintln!("{e}");
    }

    if let Err(e) = run(cli.command) {
        error!("{e}");
        // stderr gets the failure whatever the log filter says.
        eprintln!("{e}");
        process::exit(e.exit_code());
    }
}
