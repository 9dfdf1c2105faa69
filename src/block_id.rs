/// Canonicalizes a census block identifier.
///
/// Block ids show up either as plain digit strings ("10113001008") or, after a round trip
/// through a float column, as "10113001008.0" or "1.0113001008e10".  Both forms map to the
/// same digit string.  Returns None for values that don't name a block at all (empty cells,
/// "nan"), which happens when a point fell outside every census block.
pub fn normalize_block_id(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan") {
        return None;
    }

    // only treat it as a float if it isn't already a plain integer string
    let is_digits = trimmed.chars().all(|cc| cc.is_ascii_digit());
    if !is_digits {
        if let Ok(value) = trimmed.parse::<f64>() {
            if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
                return Some(format!("{}", value as i64));
            }
        }
    }

    Some(String::from(trimmed))
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_ids_unchanged() {
        assert_eq!(normalize_block_id("10113001008"), Some(String::from("10113001008")));
        assert_eq!(normalize_block_id("  10076001001 "), Some(String::from("10076001001")));
    }

    #[test]
    fn test_float_forms() {
        assert_eq!(normalize_block_id("10113001008.0"), Some(String::from("10113001008")));
        assert_eq!(normalize_block_id("1.0143001021e10"), Some(String::from("10143001021")));
    }

    #[test]
    fn test_missing_values() {
        assert_eq!(normalize_block_id(""), None);
        assert_eq!(normalize_block_id("   "), None);
        assert_eq!(normalize_block_id("NaN"), None);
        assert_eq!(normalize_block_id("nan"), None);
    }

    #[test]
    fn test_non_integer_strings_kept() {
        // not a whole number, so there's no canonical integer form
        assert_eq!(normalize_block_id("1011.5"), Some(String::from("1011.5")));
        assert_eq!(normalize_block_id("block-7"), Some(String::from("block-7")));
    }

    #[test]
    fn test_leading_zeros_kept() {
        assert_eq!(normalize_block_id("0101"), Some(String::from("0101")));
    }
}
