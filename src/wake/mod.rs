//! Wake-on-demand: liveness probing, magic-packet framing, and the
//! probe / wake / wait state machine used by the `wol` handler.

mod coordinator;
mod magic;
mod probe;
pub mod testing; // Expose for tests (ScriptedProbe, CountingWakeSender)

pub use coordinator::{PROBE_INTERVAL, WakeCoordinator, WakeError};
pub use magic::{
    DEFAULT_BROADCAST_ADDR, MAGIC_PACKET_LEN, MacAddr, MacParseError, UdpWakeSender, WakeSender,
    magic_packet,
};
pub use probe::{LivenessProbe, TcpProbe};
