use std::io;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::{Instant, sleep};
use tracing::{debug, info};

use super::magic::{MacAddr, WakeSender};
use super::probe::LivenessProbe;

/// Interval between probes while waiting for a host to come up.
pub const PROBE_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Error)]
pub enum WakeError {
    #[error("Timeout: failed to reach '{host}' after {timeout_s}s")]
    HostUnreachable { host: String, timeout_s: u64 },

    #[error("failed to send wake signal: {0}")]
    Send(#[source] io::Error),
}

/// The probe / wake / wait-until-reachable state machine.
///
/// All state is per-call: concurrent requests to the same sleeping host each
/// run their own wake sequence and each send their own wake signal.
pub struct WakeCoordinator {
    host: String,
    port: u16,
    mac: MacAddr,
    timeout: Duration,
    probe: Arc<dyn LivenessProbe>,
    waker: Arc<dyn WakeSender>,
}

impl WakeCoordinator {
    pub fn new(
        host: String,
        port: u16,
        mac: MacAddr,
        timeout: Duration,
        probe: Arc<dyn LivenessProbe>,
        waker: Arc<dyn WakeSender>,
    ) -> Self {
        Self {
            host,
            port,
            mac,
            timeout,
            probe,
            waker,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Make sure the host answers probes, waking it if necessary.
    ///
    /// One probe bounded by the configured timeout; on failure, one wake
    /// signal, then a 1s-interval probe loop until the host answers or the
    /// wall-clock budget is exhausted.
    pub async fn ensure_awake(&self) -> Result<(), WakeError> {
        let timeout_s = self.timeout.as_secs();

        debug!(host = %self.host, port = self.port, timeout_s, "Probing");
        match self.probe.probe(&self.host, self.port, Some(self.timeout)).await {
            Ok(rtt) => {
                info!(host = %self.host, rtt_ms = rtt.as_millis() as u64, "Probe successful");
                return Ok(());
            }
            Err(err) => debug!(host = %self.host, error = %err, "Initial probe failed"),
        }

        info!(mac = %self.mac, "Sending magic packet");
        self.waker.send_wake(self.mac).await.map_err(WakeError::Send)?;

        info!(host = %self.host, timeout_s, "Waiting for host to come alive");
        self.wait_until_reachable().await
    }

    async fn wait_until_reachable(&self) -> Result<(), WakeError> {
        let started = Instant::now();
        loop {
            // Each probe is bounded by the transport's own default; the
            // wall-clock budget below bounds the whole wait independently.
            if let Ok(rtt) = self.probe.probe(&self.host, self.port, None).await {
                info!(host = %self.host, rtt_ms = rtt.as_millis() as u64, "Host woke up");
                return Ok(());
            }

            if started.elapsed() > self.timeout {
                return Err(WakeError::HostUnreachable {
                    host: self.host.clone(),
                    timeout_s: self.timeout.as_secs(),
                });
            }

            debug!(host = %self.host, "Probe failed, retrying in 1s");
            sleep(PROBE_INTERVAL).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wake::testing::{CountingWakeSender, ScriptedProbe};

    fn coordinator(
        probe: Arc<ScriptedProbe>,
        waker: Arc<CountingWakeSender>,
        timeout_s: u64,
    ) -> WakeCoordinator {
        WakeCoordinator::new(
            "10.0.0.5".to_string(),
            80,
            "AA:BB:CC:DD:EE:FF".parse().unwrap(),
            Duration::from_secs(timeout_s),
            probe,
            waker,
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_reachable_host_sends_no_wake_signal() {
        let probe = Arc::new(ScriptedProbe::always_up());
        let waker = Arc::new(CountingWakeSender::default());

        coordinator(probe.clone(), waker.clone(), 5)
            .ensure_awake()
            .await
            .unwrap();

        assert_eq!(waker.sent(), 0);
        assert_eq!(probe.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sleeping_host_gets_exactly_one_wake_signal() {
        // Initial probe fails, then two wait-loop probes fail before success.
        let probe = Arc::new(ScriptedProbe::script([false, false, false, true]));
        let waker = Arc::new(CountingWakeSender::default());

        coordinator(probe.clone(), waker.clone(), 10)
            .ensure_awake()
            .await
            .unwrap();

        assert_eq!(waker.sent(), 1);
        assert_eq!(probe.calls(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unreachable_host_times_out() {
        let probe = Arc::new(ScriptedProbe::always_down());
        let waker = Arc::new(CountingWakeSender::default());

        let err = coordinator(probe, waker.clone(), 5)
            .ensure_awake()
            .await
            .unwrap_err();

        match err {
            WakeError::HostUnreachable { host, timeout_s } => {
                assert_eq!(host, "10.0.0.5");
                assert_eq!(timeout_s, 5);
            }
            other => panic!("unexpected error: {other}"),
        }
        // The failed wake sequence still broadcast its one signal.
        assert_eq!(waker.sent(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_error_message_names_host_and_budget() {
        let probe = Arc::new(ScriptedProbe::always_down());
        let waker = Arc::new(CountingWakeSender::default());

        let err = coordinator(probe, waker, 5).ensure_awake().await.unwrap_err();
        assert_eq!(err.to_string(), "Timeout: failed to reach '10.0.0.5' after 5s");
    }

    #[tokio::test(start_paused = true)]
    async fn test_send_failure_aborts_wait() {
        let probe = Arc::new(ScriptedProbe::always_down());
        let waker = Arc::new(CountingWakeSender::failing());

        let err = coordinator(probe.clone(), waker, 5)
            .ensure_awake()
            .await
            .unwrap_err();

        assert!(matches!(err, WakeError::Send(_)));
        // Only the initial probe ran; the wait loop never started.
        assert_eq!(probe.calls(), 1);
    }
}
