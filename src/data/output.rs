use std::io::Write;

use crate::error::Result;

/// Significant digits printed for every value, as with C's `%g`.
const SIG_DIGITS: usize = 6;

/// Formats `value` the way C's `%g` does: six significant digits, trailing
/// zeros dropped, scientific notation for exponents below -4 or from 6 up.
/// Negative zero prints as `0`.
pub fn format_g(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }

    // Rounding to six digits can bump the exponent (999999.7 -> 1e+06), so
    // the exponent is read back from the rounded scientific form.
    let sci = format!("{:.*e}", SIG_DIGITS - 1, value);
    let (mantissa, exp) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let exp: i32 = exp.parse().unwrap_or(0);

    if exp < -4 || exp >= SIG_DIGITS as i32 {
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", trim_fraction(mantissa), sign, exp.abs())
    } else {
        let decimals = (SIG_DIGITS as i32 - 1 - exp) as usize;
        trim_fraction(&format!("{:.*}", decimals, value)).to_string()
    }
}

fn trim_fraction(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

/// Writes `name\tv1\tv2...\n`.
pub fn write_row<W: Write + ?Sized>(out: &mut W, name: &str, values: &[f64]) -> Result<()> {
    out.write_all(name.as_bytes())?;
    for &v in values {
        write!(out, "\t{}", format_g(v))?;
    }
    out.write_all(b"\n")?;
    Ok(())
}

/// Writes a `#<label>\tname...` header line.
pub fn write_header<W: Write + ?Sized>(out: &mut W, label: &str, names: &[String]) -> Result<()> {
    write!(out, "#{label}")?;
    for name in names {
        write!(out, "\t{name}")?;
    }
    out.write_all(b"\n")?;
    Ok(())
}

/// Writes one prediction row per sample, preceded by a `#sample` header
/// when output column names are known.
pub fn write_predictions<W: Write + ?Sized>(
    out: &mut W,
    col_names: Option<&[String]>,
    row_names: &[String],
    predictions: &[Vec<f64>],
) -> Result<()> {
    if let Some(names) = col_names {
        write_header(out, "sample", names)?;
    }
    for (name, values) in row_names.iter().zip(predictions.iter()) {
        write_row(out, name, values)?;
    }
    out.flush()?;
    Ok(())
}
