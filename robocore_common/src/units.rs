//! Wire-command unit codes and their conversion to radians (§4.3, §6).
//!
//! Design note (spec §9, open question #1): the source this spec was
//! distilled from wrote the ticks-per-revolution divisor as `2 ^ 20`,
//! which in that language is bitwise XOR (`2 ^ 20 == 22`), not exponentiation.
//! This is almost certainly a typo for `2^20 = 1_048_576` ticks/revolution —
//! a 22-tick revolution is not a plausible encoder resolution for any real
//! joint. We implement the `2^20 = 1_048_576` reading; see `DESIGN.md`.

/// Ticks per revolution used by the `ticks_rot`/`nanoticks_rot` unit codes.
pub const TICKS_PER_REVOLUTION: f64 = 1_048_576.0; // 2^20, not `2 ^ 20` (XOR).

/// Position wire-command unit codes (§6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PositionUnits {
    /// Same as `Radian` (§4.3: "implicit = radian").
    Implicit = 0,
    Radian = 1,
    Degree = 2,
    TicksRot = 3,
    NanoticksRot = 4,
}

impl PositionUnits {
    #[inline]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Implicit),
            1 => Some(Self::Radian),
            2 => Some(Self::Degree),
            3 => Some(Self::TicksRot),
            4 => Some(Self::NanoticksRot),
            _ => None,
        }
    }

    /// Convert a single joint value in this unit to radians (§4.3).
    pub fn to_radians(self, value: f64) -> f64 {
        match self {
            Self::Implicit | Self::Radian => value,
            Self::Degree => value * std::f64::consts::PI / 180.0,
            Self::TicksRot => (value / TICKS_PER_REVOLUTION) * std::f64::consts::TAU,
            Self::NanoticksRot => {
                (value / (TICKS_PER_REVOLUTION * 1_000_000_000.0)) * std::f64::consts::TAU
            }
        }
    }
}

/// Velocity wire-command unit codes (§6): same families, "_second" suffixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum VelocityUnits {
    Implicit = 0,
    RadianSecond = 1,
    DegreeSecond = 2,
    TicksRotSecond = 3,
    NanoticksRotSecond = 4,
}

impl VelocityUnits {
    #[inline]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Implicit),
            1 => Some(Self::RadianSecond),
            2 => Some(Self::DegreeSecond),
            3 => Some(Self::TicksRotSecond),
            4 => Some(Self::NanoticksRotSecond),
            _ => None,
        }
    }

    /// Convert a single joint rate in this unit to rad/s (§4.3).
    pub fn to_radians_per_sec(self, value: f64) -> f64 {
        match self {
            Self::Implicit | Self::RadianSecond => value,
            Self::DegreeSecond => value * std::f64::consts::PI / 180.0,
            Self::TicksRotSecond => (value / TICKS_PER_REVOLUTION) * std::f64::consts::TAU,
            Self::NanoticksRotSecond => {
                (value / (TICKS_PER_REVOLUTION * 1_000_000_000.0)) * std::f64::consts::TAU
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn position_units_roundtrip() {
        for v in 0..=4u8 {
            let u = PositionUnits::from_u8(v).unwrap();
            assert_eq!(u as u8, v);
        }
        assert!(PositionUnits::from_u8(5).is_none());
    }

    #[test]
    fn velocity_units_roundtrip() {
        for v in 0..=4u8 {
            let u = VelocityUnits::from_u8(v).unwrap();
            assert_eq!(u as u8, v);
        }
        assert!(VelocityUnits::from_u8(5).is_none());
    }

    #[test]
    fn implicit_and_radian_are_identity() {
        assert_eq!(PositionUnits::Implicit.to_radians(1.23), 1.23);
        assert_eq!(PositionUnits::Radian.to_radians(1.23), 1.23);
    }

    #[test]
    fn degree_conversion() {
        let r = PositionUnits::Degree.to_radians(180.0);
        assert!((r - PI).abs() < 1e-12);
    }

    #[test]
    fn ticks_rot_is_one_full_revolution_at_2_pow_20() {
        let r = PositionUnits::TicksRot.to_radians(TICKS_PER_REVOLUTION);
        assert!((r - std::f64::consts::TAU).abs() < 1e-9);
    }

    #[test]
    fn nanoticks_rot_is_one_full_revolution() {
        let r = PositionUnits::NanoticksRot.to_radians(TICKS_PER_REVOLUTION * 1_000_000_000.0);
        assert!((r - std::f64::consts::TAU).abs() < 1e-6);
    }

    #[test]
    fn velocity_degree_second_conversion() {
        let r = VelocityUnits::DegreeSecond.to_radians_per_sec(90.0);
        assert!((r - PI / 2.0).abs() < 1e-12);
    }
}
