/// Flow-export collector for IPFIX and sFlow datagrams.
///
/// # Command overview
///
/// ```text
/// flx <COMMAND> [OPTIONS]
///
/// Commands:
///   listen    Receive datagrams on a UDP socket and print each decode
///   decode    Decode a single datagram stored in a file
///   sample    Write a sample datagram to a file
///   help      Print help information
///
/// Global options:
///   --log-level <FILTER>   Log filter used when RUST_LOG is unset [default: info]
///   -h, --help             Print help
///   -V, --version          Print version
/// ```
///
/// # Exit codes
///
/// | Code | Meaning                                         |
/// |------|-------------------------------------------------|
/// | 0    | Success                                         |
/// | 1    | Error (bind failure, I/O, dropped datagram)     |
///
/// Decoded output goes to stdout; logs and errors go to stderr.
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use flx_decoder::{DecoderConfig, ExportFormat, LengthCheck};

mod cmd_decode;
mod cmd_listen;
mod cmd_sample;
mod logging;
mod render;

// ── CLI root ──────────────────────────────────────────────────────────────────

/// Flow-export datagram collector.
#[derive(Parser)]
#[command(name = "flx", version, about = "IPFIX / sFlow datagram collector")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log filter used when `RUST_LOG` is not set (e.g. `debug`,
    /// `flx_decoder=trace`).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,
}

// ── Sub-commands ──────────────────────────────────────────────────────────────

#[derive(Subcommand)]
enum Commands {
    /// Receive datagrams on a UDP socket and print each decode.
    Listen(ListenArgs),
    /// Decode a single datagram stored in a file.
    Decode(DecodeArgs),
    /// Write a sample datagram to a file.
    Sample(SampleArgs),
}

// ── Argument structs ──────────────────────────────────────────────────────────

/// Decoder options shared by `listen` and `decode`.
///
/// ```text
/// ┌─────────────────┬──────────────────────────────────────────────────┐
/// │ Flag            │ Effect                                           │
/// ├─────────────────┼──────────────────────────────────────────────────┤
/// │ --format F      │ ipfix (default), sflow, or auto to sniff the     │
/// │                 │ first word of each datagram                      │
/// │ --strict-length │ Reject IPFIX datagrams whose declared lengths    │
/// │                 │ disagree with the decoded set                    │
/// └─────────────────┴──────────────────────────────────────────────────┘
/// ```
#[derive(clap::Args)]
pub struct DecoderArgs {
    /// Export format of incoming datagrams.
    #[arg(long, value_enum, default_value_t = FormatArg::Ipfix)]
    pub format: FormatArg,

    /// Cross-check the message and set length fields.
    #[arg(long)]
    pub strict_length: bool,
}

impl DecoderArgs {
    pub fn config(&self) -> DecoderConfig {
        DecoderConfig {
            format: match self.format {
                FormatArg::Auto => ExportFormat::Auto,
                FormatArg::Ipfix => ExportFormat::Ipfix,
                FormatArg::Sflow => ExportFormat::Sflow,
            },
            length_check: if self.strict_length {
                LengthCheck::Strict
            } else {
                LengthCheck::Ignore
            },
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum FormatArg {
    Auto,
    Ipfix,
    Sflow,
}

/// Arguments for `flx listen`.
///
/// Binds a UDP socket and decodes one datagram at a time until Ctrl-C.
/// Malformed datagrams are logged and skipped; the loop never stops on
/// bad input.
#[derive(clap::Args)]
pub struct ListenArgs {
    /// Address to bind, e.g. `0.0.0.0:4739`.
    pub addr: SocketAddr,

    /// Print one JSON object per datagram instead of text.
    #[arg(long)]
    pub json: bool,

    /// Receive buffer size in bytes. Longer datagrams are truncated by the
    /// socket.
    #[arg(
        long,
        default_value_t = 1500,
        value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..)
    )]
    pub max_datagram: usize,

    #[command(flatten)]
    pub decoder: DecoderArgs,
}

/// Arguments for `flx decode`.
#[derive(clap::Args)]
pub struct DecodeArgs {
    /// File holding one datagram.
    pub file: PathBuf,

    /// The file holds hex text rather than raw bytes. Whitespace is ignored.
    #[arg(long)]
    pub hex: bool,

    /// Print JSON instead of text.
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub decoder: DecoderArgs,
}

/// Arguments for `flx sample`.
///
/// ```text
/// ┌─────────────┬───────────────────────────────────────────────────┐
/// │ Kind        │ Datagram                                          │
/// ├─────────────┼───────────────────────────────────────────────────┤
/// │ ethernet    │ IPFIX, set 256, one ethernet record               │
/// │ icmp        │ IPFIX, set 266, one ICMP record                   │
/// │ unsupported │ IPFIX, set 300, opaque body                       │
/// │ sflow       │ sFlow v5, one flow sample and one counter sample  │
/// └─────────────┴───────────────────────────────────────────────────┘
/// ```
#[derive(clap::Args)]
pub struct SampleArgs {
    /// Which datagram to produce.
    #[arg(value_enum)]
    pub kind: SampleKind,

    /// Output file path.
    #[arg(short, long)]
    pub output: PathBuf,

    /// Write hex text instead of raw bytes.
    #[arg(long)]
    pub hex: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum SampleKind {
    Ethernet,
    Icmp,
    Unsupported,
    Sflow,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();
    logging::init(&cli.log_level);

    let result = match cli.command {
        Commands::Listen(args) => cmd_listen::run(&args),
        Commands::Decode(args) => cmd_decode::run(&args),
        Commands::Sample(args) => cmd_sample::run(&args),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listen_args(extra: &[&str]) -> Result<ListenArgs, clap::Error> {
        let argv = ["flx", "listen", "127.0.0.1:4739"].iter().chain(extra);
        match Cli::try_parse_from(argv)?.command {
            Commands::Listen(args) => Ok(args),
            _ => panic!("expected listen"),
        }
    }

    #[test]
    fn listen_defaults() {
        let args = listen_args(&[]).unwrap();
        assert_eq!(args.max_datagram, 1500);
        assert_eq!(args.decoder.config(), DecoderConfig::default());
    }

    #[test]
    fn zero_max_datagram_is_rejected() {
        assert!(listen_args(&["--max-datagram", "0"]).is_err());
        assert_eq!(listen_args(&["--max-datagram", "1"]).unwrap().max_datagram, 1);
    }

    #[test]
    fn auto_format_is_opt_in() {
        let args = listen_args(&["--format", "auto"]).unwrap();
        assert_eq!(args.decoder.config(), DecoderConfig::auto());
    }
}
