//! Position/velocity wire command validation and unit conversion (§4.3, §6).

use robocore_common::units::{PositionUnits, VelocityUnits};
use robocore_common::wire::{WireCmdState, WireCommandPayload};

const MAX_STATE_SEQNO_SKEW: i64 = 10;

fn validate_and_note_endpoint<'a>(
    wire: &mut WireCmdState,
    latest: Option<&'a (robocore_common::wire::ClientEndpointId, WireCommandPayload)>,
    controller_state_seqno: u64,
    joint_count: usize,
) -> Option<&'a WireCommandPayload> {
    let (endpoint, payload) = latest?;
    wire.note_endpoint(*endpoint);

    if payload.seqno <= wire.last_seqno {
        return None;
    }
    let skew = controller_state_seqno as i64 - payload.state_seqno as i64;
    if skew.abs() > MAX_STATE_SEQNO_SKEW {
        return None;
    }
    if payload.command.len() != joint_count {
        return None;
    }
    if !(payload.units.is_empty() || payload.units.len() == joint_count) {
        return None;
    }

    wire.last_seqno = payload.seqno;
    Some(payload)
}

/// §4.3 `position_command` mode: decode and unit-convert the latest payload
/// on the position wire. `begin_tick` must already have been called this
/// tick by the caller.
pub fn fill_position_command(
    wire: &mut WireCmdState,
    latest: Option<&(robocore_common::wire::ClientEndpointId, WireCommandPayload)>,
    controller_state_seqno: u64,
    joint_count: usize,
) -> Option<Vec<f64>> {
    let payload = validate_and_note_endpoint(wire, latest, controller_state_seqno, joint_count)?;

    let mut converted = Vec::with_capacity(joint_count);
    for i in 0..joint_count {
        let unit = PositionUnits::from_u8(payload.units.get(i).copied().unwrap_or(0))?;
        converted.push(unit.to_radians(payload.command[i]));
    }
    wire.sent_this_tick = true;
    Some(converted)
}

/// §4.3 `velocity_command` mode: same validation, scaled by `speed_ratio`.
pub fn fill_velocity_command(
    wire: &mut WireCmdState,
    latest: Option<&(robocore_common::wire::ClientEndpointId, WireCommandPayload)>,
    controller_state_seqno: u64,
    joint_count: usize,
    speed_ratio: f64,
) -> Option<Vec<f64>> {
    let payload = validate_and_note_endpoint(wire, latest, controller_state_seqno, joint_count)?;

    let mut converted = Vec::with_capacity(joint_count);
    for i in 0..joint_count {
        let unit = VelocityUnits::from_u8(payload.units.get(i).copied().unwrap_or(0))?;
        converted.push(unit.to_radians_per_sec(payload.command[i]) * speed_ratio);
    }
    wire.sent_this_tick = true;
    Some(converted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use robocore_common::wire::ClientEndpointId;

    fn payload(seqno: u64, state_seqno: u64, command: Vec<f64>) -> WireCommandPayload {
        WireCommandPayload {
            seqno,
            state_seqno,
            command,
            units: Vec::new(),
        }
    }

    #[test]
    fn accepts_fresh_payload_and_converts_implicit_as_radians() {
        let mut wire = WireCmdState::default();
        let ep = ClientEndpointId(1);
        let p = payload(1, 0, vec![1.0, 2.0]);
        let out = fill_position_command(&mut wire, Some(&(ep, p)), 0, 2);
        assert_eq!(out, Some(vec![1.0, 2.0]));
        assert_eq!(wire.last_seqno, 1);
        assert!(wire.sent_this_tick);
    }

    #[test]
    fn rejects_non_increasing_seqno() {
        let mut wire = WireCmdState {
            last_endpoint: Some(ClientEndpointId(1)),
            last_seqno: 5,
            ..Default::default()
        };
        let p = payload(5, 0, vec![1.0]);
        let out = fill_position_command(&mut wire, Some(&(ClientEndpointId(1), p)), 0, 1);
        assert!(out.is_none());
    }

    #[test]
    fn endpoint_change_resets_seqno_floor() {
        let mut wire = WireCmdState {
            last_endpoint: Some(ClientEndpointId(1)),
            last_seqno: 100,
            ..Default::default()
        };
        let p = payload(1, 0, vec![1.0]);
        let out = fill_position_command(&mut wire, Some(&(ClientEndpointId(2), p)), 0, 1);
        assert_eq!(out, Some(vec![1.0]));
    }

    #[test]
    fn rejects_stale_state_seqno_skew() {
        let mut wire = WireCmdState::default();
        let p = payload(1, 0, vec![1.0]);
        let out = fill_position_command(&mut wire, Some(&(ClientEndpointId(1), p)), 20, 1);
        assert!(out.is_none());
    }

    #[test]
    fn rejects_wrong_length() {
        let mut wire = WireCmdState::default();
        let p = payload(1, 0, vec![1.0, 2.0]);
        let out = fill_position_command(&mut wire, Some(&(ClientEndpointId(1), p)), 0, 3);
        assert!(out.is_none());
    }

    #[test]
    fn rejects_unknown_unit_code() {
        let mut wire = WireCmdState::default();
        let mut p = payload(1, 0, vec![1.0]);
        p.units = vec![250];
        let out = fill_position_command(&mut wire, Some(&(ClientEndpointId(1), p)), 0, 1);
        assert!(out.is_none());
    }

    #[test]
    fn velocity_scales_by_speed_ratio() {
        let mut wire = WireCmdState::default();
        let p = payload(1, 0, vec![2.0]);
        let out = fill_velocity_command(&mut wire, Some(&(ClientEndpointId(1), p)), 0, 1, 0.5);
        assert_eq!(out, Some(vec![1.0]));
    }

    #[test]
    fn no_payload_yields_none() {
        let mut wire = WireCmdState::default();
        assert!(fill_position_command(&mut wire, None, 0, 2).is_none());
    }
}
