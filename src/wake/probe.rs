use async_trait::async_trait;
use std::io;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::Instant;
use tracing::trace;

/// A single bounded-time reachability check of a host.
#[async_trait]
pub trait LivenessProbe: Send + Sync {
    /// Probe `host:port` once, bounded by `timeout` (or by the transport's
    /// own default when `None`). Returns the round-trip time on success.
    async fn probe(&self, host: &str, port: u16, timeout: Option<Duration>)
    -> io::Result<Duration>;
}

/// Probes liveness with a TCP connect to the port clients are redirected to.
/// ICMP echo is not used: it needs raw-socket privileges.
#[derive(Debug, Clone)]
pub struct TcpProbe {
    default_timeout: Duration,
}

impl TcpProbe {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(4);

    pub fn new(default_timeout: Duration) -> Self {
        Self { default_timeout }
    }
}

impl Default for TcpProbe {
    fn default() -> Self {
        Self::new(Self::DEFAULT_TIMEOUT)
    }
}

#[async_trait]
impl LivenessProbe for TcpProbe {
    async fn probe(
        &self,
        host: &str,
        port: u16,
        timeout: Option<Duration>,
    ) -> io::Result<Duration> {
        let bound = timeout.unwrap_or(self.default_timeout);
        let started = Instant::now();

        match tokio::time::timeout(bound, TcpStream::connect((host, port))).await {
            Ok(Ok(_stream)) => {
                let rtt = started.elapsed();
                trace!(host, port, rtt_ms = rtt.as_millis() as u64, "Probe connected");
                Ok(rtt)
            }
            Ok(Err(err)) => Err(err),
            Err(_elapsed) => Err(io::Error::new(
                io::ErrorKind::TimedOut,
                format!("no response from {host}:{port} within {}ms", bound.as_millis()),
            )),
        }
    }
}
