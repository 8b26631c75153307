//! Compact number formatting shared by block labels and axis ticks.

/// Fractional digits used for block labels.
pub const LABEL_PRECISION: usize = 2;

/// Fractional digits used for axis ticks.
pub const TICK_PRECISION: usize = 0;

const MILLION: f64 = 1_000_000.0;
const THOUSAND: f64 = 1_000.0;

/// Abbreviates a magnitude: `2.50M`, `1.50 K`, or a plain integer.
///
/// The value is rounded to an integer first, so fractional inputs below one
/// thousand print without decimals. Millions always use two fractional digits;
/// thousands use `precision`.
pub fn humanize(n: f64, precision: usize) -> String {
    if !n.is_finite() {
        return n.to_string();
    }
    let n = round_half_up(n);
    if n.abs() > MILLION {
        format!("{}M", to_fixed(n / MILLION, 2))
    } else if n.abs() > THOUSAND {
        format!("{} K", to_fixed(n / THOUSAND, precision))
    } else {
        format!("{}", n as i64)
    }
}

/// [`humanize`] at label precision.
pub fn humanize_value(n: f64) -> String {
    humanize(n, LABEL_PRECISION)
}

/// Tick text for the value axis. The zero tick stays unlabeled.
pub fn format_axis_tick(value: f64) -> String {
    if value == 0.0 {
        String::new()
    } else {
        humanize(value, TICK_PRECISION)
    }
}

/// Fixed-point formatting of the exact binary value. Only exact halves are
/// rounded away from zero; everything else rounds to nearest.
pub fn to_fixed(value: f64, digits: usize) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let digits = digits.min(15);
    let exp = i32::try_from(digits).unwrap_or(15);
    if is_exact_half(value, exp) {
        let factor = 10_f64.powi(exp);
        let rounded = (value * factor).round() / factor;
        return format!("{rounded:.digits$}");
    }
    format!("{value:.digits$}")
}

/// True when `value * 10^digits` is exactly `k + 0.5` for an integer `k`.
fn is_exact_half(value: f64, digits: i32) -> bool {
    let bits = value.abs().to_bits();
    let biased = ((bits >> 52) & 0x7ff) as i32;
    let fraction = bits & ((1_u64 << 52) - 1);
    let (mantissa, exp) = if biased == 0 {
        (fraction, -1074)
    } else {
        (fraction | (1_u64 << 52), biased - 1075)
    };
    if mantissa == 0 {
        return false;
    }
    // value * 10^d * 2 = odd * 5^d * 2^(zeros + exp + d + 1), odd only at 2^0.
    mantissa.trailing_zeros() as i32 + exp + digits + 1 == 0
}

/// Integer rounding where halves go towards positive infinity (`-2.5` -> `-2`).
fn round_half_up(value: f64) -> f64 {
    let rounded = (value + 0.5).floor();
    if rounded == 0.0 { 0.0 } else { rounded }
}
