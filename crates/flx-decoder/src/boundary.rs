//! The per-datagram recovery point.
//!
//! Every decode error, however deep in the IPFIX or sFlow path it is raised,
//! is propagated with `?` and lands here. The boundary turns it into a
//! [`Diagnostic`], logs it, and returns. Nothing is carried from one call
//! to the next, so a malformed datagram cannot affect the decode of the
//! datagram after it.

use std::fmt;

use flx_types::FlowRecord;
use flx_types::sflow::SflowDatagram;
use tracing::warn;

use crate::config::{DecoderConfig, ExportFormat};
use crate::decoder::{IpfixDecoder, IpfixMessage};
use crate::error::{DecodeError, ErrorClass};
use crate::sflow::SflowDecoder;

/// A successfully decoded datagram of either export format.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Datagram {
    Ipfix(IpfixMessage),
    Sflow(SflowDatagram),
}

impl Datagram {
    /// `true` for an IPFIX message whose set id has no known layout.
    #[must_use]
    pub fn is_unsupported(&self) -> bool {
        matches!(
            self,
            Self::Ipfix(IpfixMessage {
                record: FlowRecord::Unsupported { .. },
                ..
            })
        )
    }
}

/// The report for a dropped datagram.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub error: DecodeError,
    pub class: ErrorClass,
    /// Length of the dropped datagram in bytes.
    pub datagram_len: usize,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "dropped {} byte datagram ({}): {}",
            self.datagram_len, self.class, self.error
        )
    }
}

/// Result of pushing one datagram through the boundary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Decoded(Datagram),
    Dropped(Diagnostic),
}

/// Decode one datagram, converting any failure into a [`Diagnostic`].
///
/// Never panics on malformed input and never fails: the caller always gets
/// an [`Outcome`] and can move on to the next datagram.
pub fn decode_datagram(datagram: &[u8], config: &DecoderConfig) -> Outcome {
    match try_decode(datagram, config) {
        Ok(decoded) => Outcome::Decoded(decoded),
        Err(error) => {
            let class = error.class();
            warn!(
                class = class.as_str(),
                len = datagram.len(),
                "dropping datagram: {error}"
            );
            Outcome::Dropped(Diagnostic {
                error,
                class,
                datagram_len: datagram.len(),
            })
        }
    }
}

fn try_decode(datagram: &[u8], config: &DecoderConfig) -> Result<Datagram, DecodeError> {
    match config.resolve_format(datagram) {
        ExportFormat::Sflow => SflowDecoder::decode(datagram).map(Datagram::Sflow),
        ExportFormat::Ipfix | ExportFormat::Auto => {
            IpfixDecoder::decode(datagram, config).map(Datagram::Ipfix)
        }
    }
}

/// Running counters over boundary outcomes.
///
/// ```text
/// datagrams = decoded + truncated + structural
/// unsupported ⊆ decoded
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DecodeStats {
    pub datagrams: u64,
    pub decoded: u64,
    pub unsupported: u64,
    pub truncated: u64,
    pub structural: u64,
}

impl DecodeStats {
    pub fn record(&mut self, outcome: &Outcome) {
        self.datagrams += 1;
        match outcome {
            Outcome::Decoded(datagram) => {
                self.decoded += 1;
                if datagram.is_unsupported() {
                    self.unsupported += 1;
                }
            }
            Outcome::Dropped(diagnostic) => match diagnostic.class {
                ErrorClass::Truncation => self.truncated += 1,
                ErrorClass::StructuralViolation => self.structural += 1,
            },
        }
    }

    #[must_use]
    pub fn dropped(&self) -> u64 {
        self.truncated + self.structural
    }
}

impl fmt::Display for DecodeStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} datagrams: {} decoded ({} unsupported), {} truncated, {} structural",
            self.datagrams, self.decoded, self.unsupported, self.truncated, self.structural
        )
    }
}
