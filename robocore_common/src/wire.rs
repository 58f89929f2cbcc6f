//! Wire command payloads and per-(endpoint, direction) sequence tracking.
//!
//! A "wire" is a latest-value channel (GLOSSARY); a client publishes a
//! `WireCommandPayload` and only the most recent value is ever read.

/// A client-side endpoint identity, opaque to the core beyond equality.
///
/// Supplied by the RPC middleware (out of scope, §1); the core only needs
/// to notice when it changes (§4.3: "if the client endpoint changed, reset
/// `last_seqno` to 0").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClientEndpointId(pub u64);

/// Position or velocity wire command payload (§6).
#[derive(Debug, Clone, PartialEq)]
pub struct WireCommandPayload {
    /// Strictly increasing per (endpoint, direction) sequence number.
    pub seqno: u64,
    /// The `state_seqno` the client observed when it built this payload.
    pub state_seqno: u64,
    /// Per-joint command values, length must equal `N`.
    pub command: Vec<f64>,
    /// Per-joint unit codes: empty (all implicit) or length `N`.
    pub units: Vec<u8>,
}

/// Per-(endpoint, direction) bookkeeping the multiplexer needs to enforce
/// monotonic sequence numbers (§3 `WireCmdState`).
#[derive(Debug, Clone, Default)]
pub struct WireCmdState {
    /// Last endpoint observed sending on this direction.
    pub last_endpoint: Option<ClientEndpointId>,
    /// Last accepted sequence number for `last_endpoint`.
    pub last_seqno: u64,
    /// Whether a payload was accepted on this direction this tick.
    pub sent_this_tick: bool,
}

impl WireCmdState {
    /// Reset the "sent this tick" flag. Called at the top of every
    /// `fill_robot_command` invocation (§4.3).
    pub fn begin_tick(&mut self) {
        self.sent_this_tick = false;
    }

    /// Update bookkeeping for an endpoint change (§3: "changing endpoint id
    /// resets `last_seqno` to 0").
    pub fn note_endpoint(&mut self, endpoint: ClientEndpointId) {
        if self.last_endpoint != Some(endpoint) {
            self.last_endpoint = Some(endpoint);
            self.last_seqno = 0;
        }
    }
}
