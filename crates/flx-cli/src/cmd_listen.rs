/// Implementation of `flx listen`.
///
/// One datagram at a time: clear the receive buffer, wait for a datagram
/// or for shutdown, decode it through the recovery boundary, print it.
/// Shutdown is only observed between datagrams, never in the middle of a
/// decode.
///
/// ```text
///            ┌──────────────── loop ────────────────┐
///  Ctrl-C ──▶│ select! { cancelled  → break         │
///            │           recv_buf_from → decode     │──▶ stdout
///            │                          → stats     │
///            └──────────────────────────────────────┘
/// ```
use std::io;
use std::net::SocketAddr;

use anyhow::{Context, Result};
use bytes::BytesMut;
use flx_decoder::{DecodeStats, DecoderConfig, Outcome, decode_datagram};
use tokio::net::UdpSocket;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::ListenArgs;
use crate::render::{self, OutputMode};

/// Everything the receive loop needs, resolved from the command line.
#[derive(Clone, Copy, Debug)]
pub struct ListenConfig {
    pub bind: SocketAddr,
    /// Receive buffer capacity. Longer datagrams are truncated by the socket.
    pub max_datagram: usize,
    pub output: OutputMode,
    pub decoder: DecoderConfig,
}

impl From<&ListenArgs> for ListenConfig {
    fn from(args: &ListenArgs) -> Self {
        Self {
            bind: args.addr,
            max_datagram: args.max_datagram,
            output: OutputMode::from_json_flag(args.json),
            decoder: args.decoder.config(),
        }
    }
}

/// Run the `flx listen` command until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the runtime cannot start, the socket cannot be
/// bound, or stdout is closed.
pub fn run(args: &ListenArgs) -> Result<()> {
    let config = ListenConfig::from(args);
    let runtime = tokio::runtime::Runtime::new().context("failed to start tokio runtime")?;

    runtime.block_on(async {
        let shutdown = CancellationToken::new();
        let on_signal = shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                on_signal.cancel();
            }
        });

        let socket = UdpSocket::bind(config.bind)
            .await
            .with_context(|| format!("failed to bind {}", config.bind))?;
        let stats = listen(&socket, &config, &shutdown, &mut io::stdout()).await?;
        info!(%stats, "listener stopped");
        Ok(())
    })
}

/// The receive loop. Returns the accumulated counters once `shutdown` is
/// cancelled.
///
/// # Errors
///
/// Returns an error only when writing to `out` fails. Receive errors and
/// undecodable datagrams are logged and skipped.
pub async fn listen<W: io::Write>(
    socket: &UdpSocket,
    config: &ListenConfig,
    shutdown: &CancellationToken,
    out: &mut W,
) -> Result<DecodeStats> {
    info!(addr = %socket.local_addr()?, max_datagram = config.max_datagram, "listening");

    let mut buffer = BytesMut::with_capacity(config.max_datagram);
    let mut stats = DecodeStats::default();

    loop {
        buffer.clear();
        tokio::select! {
            () = shutdown.cancelled() => {
                break;
            }
            recv = socket.recv_buf_from(&mut buffer) => {
                let (received, source) = match recv {
                    Ok(result) => result,
                    Err(err) => {
                        warn!("udp recv error: {}", err);
                        continue;
                    }
                };

                debug!(%source, bytes = received, "datagram received");

                let outcome = decode_datagram(&buffer, &config.decoder);
                stats.record(&outcome);

                if let Outcome::Decoded(datagram) = &outcome {
                    let rendered = render::render(datagram, config.output);
                    match config.output {
                        OutputMode::Text => write!(out, "{rendered}")?,
                        OutputMode::Json => writeln!(out, "{rendered}")?,
                    }
                    out.flush()?;
                }
            }
        }
    }

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SampleKind;
    use crate::cmd_sample::build;

    #[tokio::test]
    async fn bad_datagram_does_not_stop_the_loop() {
        let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let config = ListenConfig {
            bind: socket.local_addr().unwrap(),
            max_datagram: 1500,
            output: OutputMode::Json,
            decoder: DecoderConfig::auto(),
        };
        let shutdown = CancellationToken::new();

        let sender = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        sender.connect(config.bind).await.unwrap();
        let ethernet = build(SampleKind::Ethernet).unwrap();
        sender.send(&[]).await.unwrap();
        sender.send(&ethernet[..12]).await.unwrap();
        sender.send(&ethernet).await.unwrap();
        sender.send(&build(SampleKind::Sflow).unwrap()).await.unwrap();

        let stopper = shutdown.clone();
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(200)).await;
            stopper.cancel();
        });

        let mut out = Vec::new();
        let stats = listen(&socket, &config, &shutdown, &mut out).await.unwrap();

        assert_eq!(stats.datagrams, 4);
        assert_eq!(stats.truncated, 2);
        assert_eq!(stats.decoded, 2);

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("\"ipfix\""));
        assert!(lines[1].contains("\"sflow\""));
    }
}
