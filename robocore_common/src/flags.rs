//! Flag bitmask published alongside robot state (§4.4, §6).
//!
//! Mirrors the teacher's `bitflags`-based error/status flag sets
//! (`PowerError`, `MotionError`): one bit per named condition, built with
//! `bitflags!` rather than a manually-packed integer.

use bitflags::bitflags;

bitflags! {
    /// Exact flag set named by §6. When `COMMUNICATION_FAILURE` is set,
    /// every other bit is clear (§4.4: "set only that bit and return").
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct StateFlags: u32 {
        const COMMUNICATION_FAILURE    = 1 << 0;
        const ERROR                    = 1 << 1;
        const ESTOP                    = 1 << 2;
        const ESTOP_BUTTON1            = 1 << 3;
        const ESTOP_OTHER              = 1 << 4;
        const ESTOP_FAULT              = 1 << 5;
        const ESTOP_INTERNAL           = 1 << 6;
        const ENABLED                  = 1 << 7;
        const READY                    = 1 << 8;
        const HOMED                    = 1 << 9;
        const HOMING_REQUIRED          = 1 << 10;
        const VALID_POSITION_COMMAND   = 1 << 11;
        const VALID_VELOCITY_COMMAND   = 1 << 12;
        const TRAJECTORY_RUNNING       = 1 << 13;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn communication_failure_is_exclusive() {
        let f = StateFlags::COMMUNICATION_FAILURE;
        assert!(f.contains(StateFlags::COMMUNICATION_FAILURE));
        assert!(!f.contains(StateFlags::READY));
    }

    #[test]
    fn flags_compose() {
        let f = StateFlags::ENABLED | StateFlags::READY | StateFlags::HOMED;
        assert!(f.contains(StateFlags::ENABLED));
        assert!(f.contains(StateFlags::READY));
        assert!(f.contains(StateFlags::HOMED));
        assert!(!f.contains(StateFlags::HOMING_REQUIRED));
    }

    #[test]
    fn estop_source_bits_are_distinct() {
        let bits = [
            StateFlags::ESTOP_BUTTON1,
            StateFlags::ESTOP_OTHER,
            StateFlags::ESTOP_FAULT,
            StateFlags::ESTOP_INTERNAL,
        ];
        for (i, a) in bits.iter().enumerate() {
            for (j, b) in bits.iter().enumerate() {
                if i != j {
                    assert!(!a.intersects(*b));
                }
            }
        }
    }
}
