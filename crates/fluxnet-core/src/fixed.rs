use fixed::types::I32F32;

/// Q32.32 fixed-point: 32 integer bits, 32 fractional bits.
pub type Fixed64 = I32F32;

/// Ticks are the atomic unit of simulation time.
pub type Ticks = u64;

/// Convert an f64 to Fixed64. Use only for initialization, never in sim loop.
#[inline]
pub fn f64_to_fixed64(v: f64) -> Fixed64 {
    Fixed64::from_num(v)
}

/// Convert Fixed64 to f64. Use only for display/FFI, never in sim loop.
#[inline]
pub fn fixed64_to_f64(v: Fixed64) -> f64 {
    v.to_num::<f64>()
}

/// Truncate a non-negative Fixed64 quantity to a whole unit count.
///
/// Negative quantities truncate to zero: a fractional or negative amount
/// never produces units.
#[inline]
pub fn whole_units(v: Fixed64) -> u64 {
    if v <= Fixed64::ZERO {
        0
    } else {
        v.to_num::<u64>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed64_basic_arithmetic() {
        let a = f64_to_fixed64(1.5);
        let b = f64_to_fixed64(2.0);
        assert_eq!(fixed64_to_f64(a + b), 3.5);
    }

    #[test]
    fn fixed64_determinism() {
        let a = f64_to_fixed64(1.0 / 3.0);
        let b = f64_to_fixed64(1.0 / 3.0);
        assert_eq!(a, b);
        assert_eq!(a * f64_to_fixed64(3.0), b * f64_to_fixed64(3.0));
    }

    #[test]
    fn whole_units_truncates_toward_zero() {
        assert_eq!(whole_units(f64_to_fixed64(2.5)), 2);
        assert_eq!(whole_units(f64_to_fixed64(0.99)), 0);
        assert_eq!(whole_units(f64_to_fixed64(100.0)), 100);
    }

    #[test]
    fn whole_units_clamps_negative_to_zero() {
        assert_eq!(whole_units(f64_to_fixed64(-3.5)), 0);
        assert_eq!(whole_units(Fixed64::ZERO), 0);
    }

    #[test]
    fn ticks_type() {
        let t: Ticks = 60;
        assert_eq!(t, 60u64);
    }
}
