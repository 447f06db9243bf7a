//! Marker text rendered in place of a failed call.

use std::fmt;

/// A fixed marker substituted into the key at the node that failed.
///
/// Sentinels are loud on purpose: a misconfigured rule shows up in every key
/// it produces. Data-range problems inside a well-formed call never produce a
/// sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sentinel {
    /// Wrong number of arguments, or a context index that does not exist.
    ArgCount,
    /// A numeric argument that is not an integer.
    BadType,
}

impl Sentinel {
    /// All sentinels, for scanning rendered keys.
    pub const ALL: [Sentinel; 2] = [Sentinel::ArgCount, Sentinel::BadType];

    /// The marker text.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ArgCount => "<ARGN>",
            Self::BadType => "<BAD-TYPE>",
        }
    }

    /// Whether a rendered key contains any sentinel marker.
    pub fn is_present_in(key: &str) -> bool {
        Self::ALL.iter().any(|s| key.contains(s.as_str()))
    }
}

impl fmt::Display for Sentinel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_text() {
        assert_eq!(Sentinel::ArgCount.as_str(), "<ARGN>");
        assert_eq!(Sentinel::BadType.to_string(), "<BAD-TYPE>");
    }

    #[test]
    fn test_is_present_in() {
        assert!(Sentinel::is_present_in("GET:<ARGN>"));
        assert!(Sentinel::is_present_in("x<BAD-TYPE>"));
        assert!(!Sentinel::is_present_in("GET:/products"));
    }
}
