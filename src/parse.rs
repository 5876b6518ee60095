//! Line parser
//!
//! A record is `<name>;<sign?><digits>.<digit>`. The measurement is returned
//! in tenths, so `-12.3` parses to `-123`. Neither the name nor the value is
//! copied and no floating point is involved.

use memchr::memchr;

use crate::{error::Malformed, Measurement};

/// Split a line (without its terminator) into the station name and the
/// measurement in tenths.
#[inline]
pub fn parse_line(line: &[u8]) -> Result<(&[u8], Measurement), Malformed> {
    let semi_idx = memchr(b';', line).ok_or(Malformed::MissingSeparator)?;
    let name = &line[..semi_idx];
    if name.is_empty() {
        return Err(Malformed::EmptyName);
    }
    let temp = parse_temp(&line[semi_idx + 1..])?;
    Ok((name, temp))
}

/// Parse `<sign?><digits>.<digit>` into tenths.
#[inline]
pub fn parse_temp(mut text: &[u8]) -> Result<Measurement, Malformed> {
    let mut sign = 1;
    if let [b'-', rest @ ..] = text {
        sign = -1;
        text = rest;
    }
    if text.is_empty() {
        return Err(Malformed::EmptyMeasurement);
    }

    let mut abs_temp: Measurement = 0;
    let mut int_digits = 0;
    // Number of digits after the `.` once it has been seen
    let mut frac_digits: Option<usize> = None;
    for &c in text {
        match c {
            b'0'..=b'9' => {
                abs_temp = abs_temp
                    .checked_mul(10)
                    .and_then(|t| t.checked_add((c - b'0') as Measurement))
                    .ok_or(Malformed::OutOfRange)?;
                match frac_digits.as_mut() {
                    Some(n) => *n += 1,
                    None => int_digits += 1,
                }
            }
            b'.' if frac_digits.is_none() => frac_digits = Some(0),
            _ => return Err(Malformed::UnexpectedByte(c)),
        }
    }

    match frac_digits {
        None => Err(Malformed::MissingDecimalPoint),
        Some(1) if int_digits > 0 => Ok(sign * abs_temp),
        Some(1) => Err(Malformed::MissingIntegerDigits),
        Some(_) => Err(Malformed::FractionDigits),
    }
}
