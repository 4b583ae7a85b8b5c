//! Scripted wake transports, exposed for tests.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::io;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use super::magic::{MacAddr, WakeSender};
use super::probe::LivenessProbe;

/// Probe whose outcomes follow a script; once the script is exhausted every
/// further probe repeats the final outcome.
pub struct ScriptedProbe {
    outcomes: Mutex<VecDeque<bool>>,
    fallback: bool,
    calls: AtomicUsize,
}

impl ScriptedProbe {
    pub fn script(outcomes: impl IntoIterator<Item = bool>) -> Self {
        let outcomes: VecDeque<bool> = outcomes.into_iter().collect();
        let fallback = outcomes.back().copied().unwrap_or(true);
        Self {
            outcomes: Mutex::new(outcomes),
            fallback,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn always_up() -> Self {
        Self::script([true])
    }

    pub fn always_down() -> Self {
        Self::script([false])
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl LivenessProbe for ScriptedProbe {
    async fn probe(
        &self,
        host: &str,
        port: u16,
        _timeout: Option<Duration>,
    ) -> io::Result<Duration> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        let up = self
            .outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(self.fallback);

        if up {
            Ok(Duration::from_millis(1))
        } else {
            Err(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                format!("{host}:{port} is down"),
            ))
        }
    }
}

/// Wake transport that records how many signals were sent.
#[derive(Default)]
pub struct CountingWakeSender {
    sent: AtomicUsize,
    fail: bool,
}

impl CountingWakeSender {
    pub fn failing() -> Self {
        Self {
            sent: AtomicUsize::new(0),
            fail: true,
        }
    }

    pub fn sent(&self) -> usize {
        self.sent.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl WakeSender for CountingWakeSender {
    async fn send_wake(&self, _mac: MacAddr) -> io::Result<()> {
        if self.fail {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "broadcast not permitted",
            ));
        }
        self.sent.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}
