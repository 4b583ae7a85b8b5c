use async_trait::async_trait;
use std::fmt;
use std::io;
use std::net::SocketAddr;
use std::str::FromStr;
use thiserror::Error;
use tokio::net::UdpSocket;
use tracing::debug;

/// A hardware (MAC) address, parsed from six `:`- or `-`-separated hex octets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MacAddr([u8; 6]);

#[derive(Debug, Error)]
#[error("invalid MAC address '{0}'")]
pub struct MacParseError(String);

impl MacAddr {
    pub fn octets(&self) -> [u8; 6] {
        self.0
    }
}

impl FromStr for MacAddr {
    type Err = MacParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split([':', '-']).collect();
        if parts.len() != 6 {
            return Err(MacParseError(s.to_string()));
        }

        let mut octets = [0u8; 6];
        for (octet, part) in octets.iter_mut().zip(&parts) {
            if part.len() != 2 {
                return Err(MacParseError(s.to_string()));
            }
            *octet = u8::from_str_radix(part, 16).map_err(|_| MacParseError(s.to_string()))?;
        }

        Ok(MacAddr(octets))
    }
}

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02X}:{b:02X}:{c:02X}:{d:02X}:{e:02X}:{g:02X}")
    }
}

pub const MAGIC_PACKET_LEN: usize = 102;

/// Frame a Wake-on-LAN magic packet: six `0xFF` bytes followed by the target
/// MAC repeated sixteen times.
pub fn magic_packet(mac: MacAddr) -> [u8; MAGIC_PACKET_LEN] {
    let mut packet = [0xFFu8; MAGIC_PACKET_LEN];
    for chunk in packet[6..].chunks_exact_mut(6) {
        chunk.copy_from_slice(&mac.octets());
    }
    packet
}

/// Fire-and-forget wake signal transport.
#[async_trait]
pub trait WakeSender: Send + Sync {
    async fn send_wake(&self, mac: MacAddr) -> io::Result<()>;
}

pub const DEFAULT_BROADCAST_ADDR: &str = "255.255.255.255:9";

/// Sends magic packets as UDP broadcast datagrams.
#[derive(Debug, Clone)]
pub struct UdpWakeSender {
    broadcast_addr: SocketAddr,
}

impl UdpWakeSender {
    pub fn new(broadcast_addr: SocketAddr) -> Self {
        Self { broadcast_addr }
    }
}

impl Default for UdpWakeSender {
    fn default() -> Self {
        Self::new(DEFAULT_BROADCAST_ADDR.parse().unwrap())
    }
}

#[async_trait]
impl WakeSender for UdpWakeSender {
    async fn send_wake(&self, mac: MacAddr) -> io::Result<()> {
        let socket = UdpSocket::bind("0.0.0.0:0").await?;
        socket.set_broadcast(true)?;
        socket.send_to(&magic_packet(mac), self.broadcast_addr).await?;
        debug!(%mac, broadcast = %self.broadcast_addr, "Magic packet sent");
        Ok(())
    }
}
