//! Integer values of kubernetes resource quantities (`110`, `1k`, `2e2`, `110500m`, `1Ki`).

/// Parses a quantity and rounds it up to the nearest integer.
///
/// Returns `None` for malformed or negative quantities. Values too large
/// for a `u64` saturate at `u64::MAX`.
pub fn parse_quantity_value(quantity: &str) -> Option<u64> {
    let quantity = quantity.trim();
    let (negative, unsigned) = match quantity.as_bytes().first()? {
        b'-' => (true, &quantity[1..]),
        b'+' => (false, &quantity[1..]),
        _ => (false, quantity),
    };

    let number_len = unsigned
        .find(|c: char| !c.is_ascii_digit() && c != '.')
        .unwrap_or(unsigned.len());
    let (number, suffix) = unsigned.split_at(number_len);
    let (binary_exponent, decimal_exponent) = parse_suffix(suffix)?;

    let (whole, fraction) = number.split_once('.').unwrap_or((number, ""));
    if (whole.is_empty() && fraction.is_empty()) || fraction.contains('.') {
        return None;
    }

    let digits = whole.trim_start_matches('0').to_owned() + fraction;
    let digits = digits.trim_start_matches('0');
    if digits.is_empty() {
        return Some(0);
    }

    if negative {
        return None;
    }

    let fraction_len = i64::try_from(fraction.len()).ok()?;
    let scale = i64::from(decimal_exponent) - fraction_len;

    Some(scaled_value(digits, binary_exponent, scale))
}

fn parse_suffix(suffix: &str) -> Option<(u32, i32)> {
    let exponents = match suffix {
        "" => (0, 0),
        "n" => (0, -9),
        "u" => (0, -6),
        "m" => (0, -3),
        "k" => (0, 3),
        "M" => (0, 6),
        "G" => (0, 9),
        "T" => (0, 12),
        "P" => (0, 15),
        "E" => (0, 18),
        "Ki" => (10, 0),
        "Mi" => (20, 0),
        "Gi" => (30, 0),
        "Ti" => (40, 0),
        "Pi" => (50, 0),
        "Ei" => (60, 0),
        _ => {
            let exponent = suffix
                .strip_prefix('e')
                .or_else(|| suffix.strip_prefix('E'))?;
            let unsigned = exponent
                .strip_prefix('-')
                .or_else(|| exponent.strip_prefix('+'))
                .unwrap_or(exponent);

            if unsigned.is_empty() || !unsigned.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }

            (0, exponent.parse().ok()?)
        }
    };

    Some(exponents)
}

/// `ceil(digits * 2^binary_exponent * 10^scale)`, saturating.
fn scaled_value(digits: &str, binary_exponent: u32, scale: i64) -> u64 {
    // only mantissas with more than 38 significant digits don't fit
    let Ok(mut value) = digits.parse::<u128>() else {
        return u64::MAX;
    };

    value = match 1u128
        .checked_shl(binary_exponent)
        .and_then(|factor| value.checked_mul(factor))
    {
        Some(value) => value,
        None => return u64::MAX,
    };

    if scale >= 0 {
        let factor = u32::try_from(scale)
            .ok()
            .and_then(|scale| 10u128.checked_pow(scale));

        return factor
            .and_then(|factor| value.checked_mul(factor))
            .map_or(u64::MAX, saturate);
    }

    match u32::try_from(-scale).ok().and_then(|scale| 10u128.checked_pow(scale)) {
        Some(divisor) => saturate(value / divisor + u128::from(value % divisor != 0)),
        None => 1,
    }
}

fn saturate(value: u128) -> u64 {
    u64::try_from(value).unwrap_or(u64::MAX)
}
