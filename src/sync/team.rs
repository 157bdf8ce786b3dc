//! Team affiliation

use serde::{Deserialize, Serialize};

/// One of the two arena sides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Team {
    /// Blue side
    Blue,
    /// Red side
    Red,
}

impl Team {
    /// Parse a team name, ignoring case. Unknown names are `None`.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        if name.eq_ignore_ascii_case("blue") {
            Some(Self::Blue)
        } else if name.eq_ignore_ascii_case("red") {
            Some(Self::Red)
        } else {
            None
        }
    }

    /// The opposing team
    #[must_use]
    pub fn opponent(self) -> Self {
        match self {
            Self::Blue => Self::Red,
            Self::Red => Self::Blue,
        }
    }
}

/// Hostile only when both sides are known and differ
#[must_use]
pub fn is_hostile(a: Option<Team>, b: Option<Team>) -> bool {
    matches!((a, b), (Some(a), Some(b)) if a != b)
}

/// Allied only when both sides are known and equal
#[must_use]
pub fn are_allies(a: Option<Team>, b: Option<Team>) -> bool {
    matches!((a, b), (Some(a), Some(b)) if a == b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(Team::parse("BLUE"), Some(Team::Blue));
        assert_eq!(Team::parse("Red"), Some(Team::Red));
        assert_eq!(Team::parse("green"), None);
        assert_eq!(Team::parse(""), None);
    }

    #[test]
    fn test_hostility_needs_both_sides() {
        assert!(is_hostile(Some(Team::Blue), Some(Team::Red)));
        assert!(!is_hostile(Some(Team::Blue), Some(Team::Blue)));
        assert!(!is_hostile(None, Some(Team::Red)));
        assert!(are_allies(Some(Team::Red), Some(Team::Red)));
        assert!(!are_allies(None, None));
        assert_eq!(Team::Blue.opponent(), Team::Red);
    }
}
