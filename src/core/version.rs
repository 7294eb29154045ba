//! Dotted version parsing and comparison.
//!
//! Versions are compared segment by segment with missing trailing segments
//! treated as `0`, so `1.2` and `1.2.0` are the same version. Parsing never
//! fails: a segment that is not a non-negative integer becomes `0`.

use std::cmp::Ordering;
use std::fmt;

/// A parsed dotted version such as `0.2.0`.
#[derive(Debug, Clone, Default)]
pub struct Version {
    segments: Vec<u64>,
}

impl Version {
    /// Parse a dotted version string.
    ///
    /// Each `.`-separated segment is trimmed and parsed as an integer;
    /// anything unparseable (including negative numbers) degrades to `0`.
    pub fn parse(input: &str) -> Self {
        let segments = input.trim().split('.').map(parse_segment).collect();
        Self { segments }
    }

    /// The parsed segments, as written (no padding).
    pub fn segments(&self) -> &[u64] {
        &self.segments
    }

    fn segment(&self, index: usize) -> u64 {
        self.segments.get(index).copied().unwrap_or(0)
    }
}

fn parse_segment(segment: &str) -> u64 {
    let segment = segment.trim();
    let digits = segment.strip_prefix('+').unwrap_or(segment);
    match digits.parse() {
        Ok(value) => value,
        // Too large for u64 but still a number
        Err(_) if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) => u64::MAX,
        Err(_) => 0,
    }
}

impl From<&str> for Version {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.segments.len().max(other.segments.len());
        (0..len)
            .map(|i| self.segment(i).cmp(&other.segment(i)))
            .find(|ord| ord.is_ne())
            .unwrap_or(Ordering::Equal)
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.segments.iter().map(u64::to_string).collect();
        write!(f, "{}", parts.join("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_zeros_are_equal() {
        assert_eq!(Version::parse("1.2"), Version::parse("1.2.0"));
        assert_eq!(Version::parse("1"), Version::parse("1.0.0.0"));
    }

    #[test]
    fn test_ordering() {
        assert!(Version::parse("2.0") > Version::parse("1.9.9"));
        assert!(Version::parse("0.2.0") < Version::parse("0.10.0"));
        assert!(Version::parse("0.2.1") > Version::parse("0.2"));
        assert!(Version::parse("9.9.9") > Version::parse("0.2.0"));
    }

    #[test]
    fn test_malformed_segments_become_zero() {
        assert_eq!(Version::parse("1.x.3").segments(), &[1, 0, 3]);
        assert_eq!(Version::parse("beta").segments(), &[0]);
        assert_eq!(Version::parse("").segments(), &[0]);
        assert_eq!(Version::parse("1.-2").segments(), &[1, 0]);
        assert_eq!(Version::parse(" 1 . 4 ").segments(), &[1, 4]);
    }

    #[test]
    fn test_malformed_degrades_to_lower_version() {
        assert!(Version::parse("1.rc1") < Version::parse("1.1"));
        assert_eq!(Version::parse("garbage"), Version::parse("0.0.0"));
    }

    #[test]
    fn test_oversized_segment_saturates() {
        let big = Version::parse("1.18446744073709551616");
        assert_eq!(big.segments(), &[1, u64::MAX]);
        assert!(big > Version::parse("1.1"));
        assert!(Version::parse("99999999999999999999999") > Version::parse("2.0"));
    }

    #[test]
    fn test_display() {
        assert_eq!(Version::parse("0.2.0").to_string(), "0.2.0");
        assert_eq!(Version::parse("1.x").to_string(), "1.0");
    }
}
