/// Implementation of `flx decode`.
///
/// Reads one datagram from a file, pushes it through the same recovery
/// boundary the listener uses, and prints the result. A dropped datagram
/// is reported as an error so the process exits with code 1.
use std::fs;
use std::io::{self, Write as _};

use anyhow::{Context, Result, bail};
use flx_decoder::{Outcome, decode_datagram};

use crate::DecodeArgs;
use crate::render::{self, OutputMode};

/// Run the `flx decode` command.
///
/// # Errors
///
/// Returns an error if the file cannot be read, the hex text is invalid,
/// or the datagram is dropped by the decoder.
pub fn run(args: &DecodeArgs) -> Result<()> {
    let raw =
        fs::read(&args.file).with_context(|| format!("cannot read {}", args.file.display()))?;

    let bytes = if args.hex {
        parse_hex(&raw).with_context(|| format!("invalid hex in {}", args.file.display()))?
    } else {
        raw
    };

    match decode_datagram(&bytes, &args.decoder.config()) {
        Outcome::Decoded(datagram) => {
            let mode = OutputMode::from_json_flag(args.json);
            let mut stdout = io::stdout().lock();
            write!(stdout, "{}", render::render(&datagram, mode))?;
            if mode == OutputMode::Json {
                writeln!(stdout)?;
            }
            Ok(())
        }
        Outcome::Dropped(diagnostic) => bail!("{}: {diagnostic}", args.file.display()),
    }
}

/// Decode hex text, ignoring ASCII whitespace between digits.
fn parse_hex(raw: &[u8]) -> Result<Vec<u8>> {
    let digits: Vec<u8> = raw
        .iter()
        .copied()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    Ok(hex::decode(digits)?)
}
