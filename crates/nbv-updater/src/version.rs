//! Dotted numeric version strings and their ordering.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::UpdateError;

/// A version parsed from a dot-delimited numeric string such as `"1.12.0"`.
///
/// Comparison is lexicographic over the components with missing trailing
/// components treated as zero, so `"1.2"` compares equal to `"1.2.0"`.
/// The parsed component sequence is kept as written; equal versions need
/// not render identically.
#[derive(Debug, Clone)]
pub struct Version {
    components: Vec<u64>,
}

impl Version {
    /// The parsed numeric components, in order.
    pub fn components(&self) -> &[u64] {
        &self.components
    }
}

impl FromStr for Version {
    type Err = UpdateError;

    /// Parse a dotted version string.
    ///
    /// Splits on `.` and parses each part as an unsigned integer. Any empty
    /// or non-numeric part fails the whole parse.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut components = Vec::new();
        for part in s.split('.') {
            let value: u64 = part.parse().map_err(|_| UpdateError::VersionParse {
                input: s.to_string(),
                component: part.to_string(),
            })?;
            components.push(value);
        }
        Ok(Self { components })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = self
            .components
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join(".");
        f.write_str(&rendered)
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.components.len().max(other.components.len());
        for i in 0..len {
            let a = self.components.get(i).copied().unwrap_or(0);
            let b = other.components.get(i).copied().unwrap_or(0);
            match a.cmp(&b) {
                Ordering::Equal => continue,
                unequal => return unequal,
            }
        }
        Ordering::Equal
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// Equality must agree with the padded ordering, so it cannot be derived.
impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        s.parse().expect("valid version")
    }

    #[test]
    fn test_parse_basic() {
        assert_eq!(v("1.12.0").components(), &[1, 12, 0]);
        assert_eq!(v("7").components(), &[7]);
    }

    #[test]
    fn test_parse_rejects_non_numeric() {
        assert!("1.a.0".parse::<Version>().is_err());
        assert!("".parse::<Version>().is_err());
        assert!("1..2".parse::<Version>().is_err());
        assert!("1.2.".parse::<Version>().is_err());
        assert!("-1.2".parse::<Version>().is_err());
    }

    #[test]
    fn test_parse_error_names_component() {
        let err = "1.a.0".parse::<Version>().unwrap_err();
        match err {
            UpdateError::VersionParse { input, component } => {
                assert_eq!(input, "1.a.0");
                assert_eq!(component, "a");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_patch_increment_is_greater() {
        assert!(v("1.0.1") > v("1.0.0"));
        assert_eq!(v("1.0.0").cmp(&v("1.0.1")), Ordering::Less);
    }

    #[test]
    fn test_missing_components_compare_as_zero() {
        assert_eq!(v("2.0"), v("2.0.0"));
        assert_eq!(v("2.0").cmp(&v("2.0.0")), Ordering::Equal);
        assert!(v("2.0.1") > v("2.0"));
        assert!(v("2") < v("2.0.1"));
    }

    #[test]
    fn test_first_inequality_wins() {
        assert!(v("1.9.9") < v("2.0.0"));
        assert!(v("1.10") > v("1.9.9"));
    }

    #[test]
    fn test_display_round_trip() {
        assert_eq!(v("1.12.0").to_string(), "1.12.0");
        assert_eq!(v("1.2").to_string(), "1.2");
    }
}
