use async_trait::async_trait;
use axum::http::Method;
use std::sync::Arc;
use std::time::Duration;

use super::plain::PlainRedirect;
use super::registry::HandlerEntry;
use super::traits::{HandlerSpec, RedirectAction, RedirectHandler, require_options};
use crate::api::error::ProxyError;
use crate::config::{MappingDefinition, ValidationError};
use crate::wake::{LivenessProbe, TcpProbe, UdpWakeSender, WakeCoordinator, WakeSender};

const SPEC: HandlerSpec = HandlerSpec {
    key: "wol",
    summary: "Wake-on-LAN redirect",
    description: "Probes the target host before redirecting. When the host does not \
respond, a magic packet is broadcast and the redirect waits until the host comes \
alive or the timeout elapses.",
    required_options: &["mac", "timeout_s"],
};

/// Redirect that wakes the target host first.
///
/// Composes the wake state machine with a plain redirect as the final step.
pub struct WolRedirect {
    redirect: PlainRedirect,
    coordinator: WakeCoordinator,
}

impl std::fmt::Debug for WolRedirect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WolRedirect").finish_non_exhaustive()
    }
}

impl WolRedirect {
    /// Build from a mapping with explicit transports.
    ///
    /// All option values are parsed here, so a bad `timeout_s` or `mac`
    /// rejects the configuration at startup instead of failing per-request.
    pub fn from_mapping(
        mapping: &MappingDefinition,
        probe: Arc<dyn LivenessProbe>,
        waker: Arc<dyn WakeSender>,
    ) -> Result<Self, ValidationError> {
        require_options(&SPEC, mapping)?;

        let raw_timeout = &mapping.options["timeout_s"];
        let timeout_s: u64 = raw_timeout.parse().map_err(|_| {
            invalid_option("timeout_s", raw_timeout, "expected an integer number of seconds")
        })?;

        let raw_mac = &mapping.options["mac"];
        let mac = raw_mac
            .parse()
            .map_err(|_| invalid_option("mac", raw_mac, "expected six hex octets"))?;

        let host = mapping
            .target_url
            .host_str()
            .ok_or_else(|| ValidationError::MissingHost {
                url: mapping.target_url.to_string(),
            })?
            .to_string();
        let port = mapping.target_url.port_or_known_default().unwrap_or(80);

        Ok(Self {
            redirect: PlainRedirect::from_mapping(mapping)?,
            coordinator: WakeCoordinator::new(
                host,
                port,
                mac,
                Duration::from_secs(timeout_s),
                probe,
                waker,
            ),
        })
    }

    /// Registry entry using the production transports: TCP-connect probes and
    /// UDP broadcast wake packets. The optional `broadcast_addr` option
    /// overrides the default limited-broadcast destination.
    pub fn entry() -> HandlerEntry {
        HandlerEntry {
            spec: SPEC,
            factory: Arc::new(|mapping| {
                let waker = match mapping.options.get("broadcast_addr") {
                    Some(raw) => UdpWakeSender::new(raw.parse().map_err(|_| {
                        invalid_option("broadcast_addr", raw, "expected a socket address")
                    })?),
                    None => UdpWakeSender::default(),
                };

                let handler = WolRedirect::from_mapping(
                    mapping,
                    Arc::new(TcpProbe::default()),
                    Arc::new(waker),
                )?;
                Ok(Arc::new(handler) as Arc<dyn RedirectHandler>)
            }),
        }
    }
}

fn invalid_option(key: &str, value: &str, reason: &str) -> ValidationError {
    ValidationError::InvalidOption {
        handler: SPEC.key.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

#[async_trait]
impl RedirectHandler for WolRedirect {
    fn spec(&self) -> &HandlerSpec {
        &SPEC
    }

    fn mapping(&self) -> &MappingDefinition {
        self.redirect.mapping()
    }

    async fn handle(
        &self,
        method: &Method,
        path_remainder: Option<&str>,
    ) -> Result<RedirectAction, ProxyError> {
        self.coordinator.ensure_awake().await?;
        self.redirect.handle(method, path_remainder).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wake::testing::{CountingWakeSender, ScriptedProbe};

    fn mapping(options: &[(&str, &str)]) -> MappingDefinition {
        MappingDefinition {
            source_url: "http://wake.local/go/*".parse().unwrap(),
            target_url: "http://10.0.0.5:8006".parse().unwrap(),
            handler: "wol".to_string(),
            methods: vec!["GET".to_string()],
            options: options
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    fn build(
        options: &[(&str, &str)],
        probe: Arc<ScriptedProbe>,
        waker: Arc<CountingWakeSender>,
    ) -> Result<WolRedirect, ValidationError> {
        WolRedirect::from_mapping(&mapping(options), probe, waker)
    }

    #[test]
    fn test_missing_options_fail_construction() {
        let err = build(
            &[("mac", "AA:BB:CC:DD:EE:FF")],
            Arc::new(ScriptedProbe::always_up()),
            Arc::new(CountingWakeSender::default()),
        )
        .unwrap_err();
        assert!(matches!(err, ValidationError::MissingOptions { .. }));
    }

    #[test]
    fn test_non_numeric_timeout_fails_construction() {
        let err = build(
            &[("mac", "AA:BB:CC:DD:EE:FF"), ("timeout_s", "soon")],
            Arc::new(ScriptedProbe::always_up()),
            Arc::new(CountingWakeSender::default()),
        )
        .unwrap_err();
        match err {
            ValidationError::InvalidOption { key, value, .. } => {
                assert_eq!(key, "timeout_s");
                assert_eq!(value, "soon");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_malformed_mac_fails_construction() {
        let err = build(
            &[("mac", "not-a-mac"), ("timeout_s", "5")],
            Arc::new(ScriptedProbe::always_up()),
            Arc::new(CountingWakeSender::default()),
        )
        .unwrap_err();
        assert!(matches!(err, ValidationError::InvalidOption { key, .. } if key == "mac"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reachable_host_redirects_without_wake() {
        let probe = Arc::new(ScriptedProbe::always_up());
        let waker = Arc::new(CountingWakeSender::default());
        let handler = build(
            &[("mac", "AA:BB:CC:DD:EE:FF"), ("timeout_s", "5")],
            probe,
            waker.clone(),
        )
        .unwrap();

        let action = handler.handle(&Method::GET, Some("vm/101")).await.unwrap();
        assert_eq!(action.location, "http://10.0.0.5:8006/vm/101");
        assert_eq!(waker.sent(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sleeping_host_is_woken_then_redirected() {
        let probe = Arc::new(ScriptedProbe::script([false, false, true]));
        let waker = Arc::new(CountingWakeSender::default());
        let handler = build(
            &[("mac", "AA:BB:CC:DD:EE:FF"), ("timeout_s", "10")],
            probe,
            waker.clone(),
        )
        .unwrap();

        let action = handler.handle(&Method::GET, None).await.unwrap();
        assert_eq!(action.location, "http://10.0.0.5:8006/");
        assert_eq!(waker.sent(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unreachable_host_surfaces_timeout() {
        let probe = Arc::new(ScriptedProbe::always_down());
        let waker = Arc::new(CountingWakeSender::default());
        let handler = build(
            &[("mac", "AA:BB:CC:DD:EE:FF"), ("timeout_s", "5")],
            probe,
            waker.clone(),
        )
        .unwrap();

        let err = handler.handle(&Method::GET, None).await.unwrap_err();
        match err {
            ProxyError::HostUnreachable { host, timeout_s } => {
                assert_eq!(host, "10.0.0.5");
                assert_eq!(timeout_s, 5);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(waker.sent(), 1);
    }
}
