//! parser.rs
//! Turns one raw text line into per-channel samples.
//!
//! Microcontroller links deliver `\r`, partial tokens and binary noise, so nothing in
//! here fails: a token that cannot be salvaged is dropped and a line without numbers
//! yields an empty vector ("no sample this line").

/// Characters kept when salvaging a token that does not parse as-is.
fn is_numeric_char(ch: char) -> bool {
    ch.is_ascii_digit() || matches!(ch, '.' | '-' | '+' | 'e' | 'E')
}

/// Parse a single token, falling back to stripping non-numeric characters.
pub fn parse_token(token: &str) -> Option<f64> {
    if let Ok(v) = token.parse::<f64>() {
        return Some(v);
    }
    let cleaned: String = token.chars().filter(|c| is_numeric_char(*c)).collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok()
}

/// Split `line` on `delimiter` (or on whitespace runs when `None`) and convert every
/// non-empty token.
pub fn parse_line(line: &str, delimiter: Option<&str>) -> Vec<f64> {
    let line = line.trim();
    match delimiter.filter(|d| !d.is_empty()) {
        Some(delim) => line
            .split(delim)
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .filter_map(parse_token)
            .collect(),
        None => line.split_whitespace().filter_map(parse_token).collect(),
    }
}

/// Pad with `0.0` or truncate so the result holds exactly `channels` values.
pub fn normalize(mut values: Vec<f64>, channels: usize) -> Vec<f64> {
    values.resize(channels, 0.0);
    values
}

/// Parse then normalize; `None` when the line carried no numeric content.
pub fn process_line(line: &str, delimiter: Option<&str>, channels: usize) -> Option<Vec<f64>> {
    let values = parse_line(line, delimiter);
    if values.is_empty() {
        return None;
    }
    Some(normalize(values, channels))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_split() {
        assert_eq!(parse_line("1 2 3", None), vec![1.0, 2.0, 3.0]);
        assert_eq!(parse_line("  4.5\t-6   7e2\r\n", None), vec![4.5, -6.0, 700.0]);
    }

    #[test]
    fn delimiter_split_drops_empty_tokens() {
        assert_eq!(parse_line("1,2,3", Some(",")), vec![1.0, 2.0, 3.0]);
        assert_eq!(parse_line("1,,3", Some(",")), vec![1.0, 3.0]);
        assert_eq!(parse_line("1, 2 ,3,", Some(",")), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn multi_char_delimiter() {
        assert_eq!(parse_line("1;;2;;3", Some(";;")), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn garbage_is_salvaged_or_dropped() {
        let values = parse_line("12ab.3,x", Some(","));
        assert_eq!(values, vec![12.3]);
        assert_eq!(parse_line("x,y,z", Some(",")), Vec::<f64>::new());
        assert_eq!(parse_line("T=21.5C", None), vec![21.5]);
    }

    #[test]
    fn unsalvageable_token_is_dropped() {
        // "e" survives the filter but is still not a number
        assert_eq!(parse_line("e 5", None), vec![5.0]);
        assert_eq!(parse_line("--", None), Vec::<f64>::new());
    }

    #[test]
    fn empty_lines() {
        assert!(parse_line("", None).is_empty());
        assert!(parse_line("   \r\n", None).is_empty());
        assert!(parse_line("", Some(",")).is_empty());
    }

    #[test]
    fn empty_delimiter_falls_back_to_whitespace() {
        assert_eq!(parse_line("1 2", Some("")), vec![1.0, 2.0]);
    }

    #[test]
    fn replacement_characters_are_stripped() {
        let lossy = String::from_utf8_lossy(b"3.5\xff 4");
        assert_eq!(parse_line(&lossy, None), vec![3.5, 4.0]);
    }

    #[test]
    fn normalize_pads_and_truncates() {
        assert_eq!(normalize(vec![1.0], 3), vec![1.0, 0.0, 0.0]);
        assert_eq!(normalize(vec![1.0, 2.0, 3.0, 4.0], 2), vec![1.0, 2.0]);
        assert_eq!(normalize(vec![1.0, 2.0], 2), vec![1.0, 2.0]);
    }

    #[test]
    fn process_line_skips_lines_without_numbers() {
        assert_eq!(process_line("hello", None, 2), None);
        assert_eq!(process_line("7", None, 2), Some(vec![7.0, 0.0]));
    }
}
