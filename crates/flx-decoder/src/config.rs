/// Decoder configuration, passed explicitly to every decode call.
///
/// ```text
/// ┌──────────────┬──────────────────────────────────────────────────┐
/// │ Field        │ Purpose                                          │
/// ├──────────────┼──────────────────────────────────────────────────┤
/// │ format       │ Expected export encoding, or Auto to sniff it    │
/// │ length_check │ Whether declared header lengths are validated    │
/// └──────────────┴──────────────────────────────────────────────────┘
/// ```
///
/// The default expects IPFIX and ignores declared lengths, so record reads
/// are sized by the set id alone. Format sniffing is opt-in through
/// [`ExportFormat::Auto`] because an IPFIX header with version 0 and length
/// 5 has the same first word as an sFlow v5 datagram.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DecoderConfig {
    pub format: ExportFormat,
    pub length_check: LengthCheck,
}

impl DecoderConfig {
    /// Default configuration with per-datagram format sniffing.
    #[must_use]
    pub fn auto() -> Self {
        Self {
            format: ExportFormat::Auto,
            ..Self::default()
        }
    }

    /// Resolve the encoding of `datagram` under this configuration.
    ///
    /// `Auto` picks sFlow when the first big-endian word equals 5 and IPFIX
    /// otherwise. An IPFIX header starts with a 16-bit version followed by
    /// a 16-bit length, so its first word is never 5 for a version 10
    /// message. Other versions are not validated and can be misrouted.
    #[must_use]
    pub fn resolve_format(&self, datagram: &[u8]) -> ExportFormat {
        match self.format {
            ExportFormat::Auto => match datagram.first_chunk::<4>() {
                Some(word) if u32::from_be_bytes(*word) == flx_types::sflow::SFLOW_VERSION => {
                    ExportFormat::Sflow
                }
                _ => ExportFormat::Ipfix,
            },
            fixed => fixed,
        }
    }
}

/// Export encoding of incoming datagrams.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExportFormat {
    /// Decide per datagram by looking at the first word.
    Auto,
    #[default]
    Ipfix,
    Sflow,
}

/// Treatment of the length fields declared in IPFIX message and set
/// headers.
///
/// ```text
/// ┌────────┬──────────────────────────────────────────────────────────┐
/// │ Mode   │ Behavior                                                 │
/// ├────────┼──────────────────────────────────────────────────────────┤
/// │ Ignore │ Lengths are reported but never checked.                  │
/// │ Strict │ set.length == 4 + record length and                      │
/// │        │ header.length == 16 + set.length, else LengthMismatch.   │
/// │        │ Unsupported sets only get the message-level check.       │
/// └────────┴──────────────────────────────────────────────────────────┘
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LengthCheck {
    #[default]
    Ignore,
    Strict,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_expects_ipfix() {
        let config = DecoderConfig::default();
        assert_eq!(config.format, ExportFormat::Ipfix);
        assert_eq!(config.resolve_format(&[0, 0, 0, 5, 0, 0]), ExportFormat::Ipfix);
    }

    #[test]
    fn auto_sniffs_first_word() {
        let config = DecoderConfig::auto();
        assert_eq!(config.resolve_format(&[0, 0, 0, 5, 0, 0]), ExportFormat::Sflow);
        assert_eq!(config.resolve_format(&[0, 10, 0, 40]), ExportFormat::Ipfix);
        assert_eq!(config.resolve_format(&[0, 0, 0]), ExportFormat::Ipfix);
        assert_eq!(config.resolve_format(&[]), ExportFormat::Ipfix);
    }

    #[test]
    fn fixed_format_is_not_sniffed() {
        let config = DecoderConfig {
            format: ExportFormat::Sflow,
            ..DecoderConfig::default()
        };
        assert_eq!(config.resolve_format(&[0, 10, 0, 40]), ExportFormat::Sflow);
    }
}
