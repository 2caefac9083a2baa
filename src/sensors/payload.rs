//! Text payload sent to scripting callbacks.
//!
//! Scripting callbacks receive a reading as a bracketed, comma separated
//! list such as `[0.1, 0.2, 9.8]`. Each value is rendered the way a JVM
//! `float` prints, which is what existing scripting code parses.

/// Render a single value.
///
/// Integral values keep a trailing `.0`; magnitudes below `1e-3` or at
/// least `1e7` use `E` notation (`1.0E-4`, `1.5E7`).
pub fn format_value(value: f32) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0.0" } else { "0.0" }.to_string();
    }

    let magnitude = value.abs();
    if (1e-3..1e7).contains(&magnitude) {
        let mut s = value.to_string();
        if !s.contains('.') {
            s.push_str(".0");
        }
        return s;
    }

    let scientific = format!("{:e}", value);
    match scientific.split_once('e') {
        Some((mantissa, exponent)) if mantissa.contains('.') => {
            format!("{}E{}", mantissa, exponent)
        }
        Some((mantissa, exponent)) => format!("{}.0E{}", mantissa, exponent),
        None => scientific,
    }
}

/// Render a reading as `[v0, v1, ...]`.
pub fn format_values(values: &[f32]) -> String {
    let parts: Vec<String> = values.iter().map(|v| format_value(*v)).collect();
    format!("[{}]", parts.join(", "))
}
