/// Session length used when a duration label carries no usable number
pub const DEFAULT_DURATION_SECS: u32 = 60;

/// Parse a duration label such as `"60 seg"` into whole seconds.
///
/// Every non-digit character is dropped and the remaining digits are read as
/// one number, so `"1 min 30"` yields `130`. Labels without digits, with a
/// zero value, or with more digits than fit a `u32` fall back to
/// [`DEFAULT_DURATION_SECS`].
pub fn parse_duration_label(label: &str) -> u32 {
    let digits: String = label.chars().filter(char::is_ascii_digit).collect();

    match digits.parse::<u32>() {
        Ok(secs) if secs > 0 => secs,
        _ => DEFAULT_DURATION_SECS,
    }
}
