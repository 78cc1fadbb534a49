use core::fmt;

use crate::Dir;

/// The balance factor of a node: `height(right) - height(left)`.
///
/// Only `-1`, `0` and `1` are valid once a mutation has finished. `-2` and `2` show up transiently
/// while a fix-up is deciding which rotation to perform.
#[derive(Copy, Clone, Default, PartialEq, Eq)]
pub(crate) struct Balance(i8);

impl Balance {
    pub(crate) const LEVEL: Balance = Balance(0);

    /// Returns the balance of a node whose `dir` subtree is one level taller than the other.
    #[inline]
    pub(crate) const fn leaning(dir: Dir) -> Balance {
        match dir {
            Dir::Left => Balance(-1),
            Dir::Right => Balance(1),
        }
    }

    #[inline]
    pub(crate) const fn get(self) -> i8 {
        self.0
    }

    /// Returns the balance after the `dir` subtree grew by one level.
    #[inline]
    pub(crate) fn tilted(self, dir: Dir) -> Balance {
        let next = self.0 + Balance::leaning(dir).0;
        assert!(
            (-2..=2).contains(&next),
            "balance factor out of range: {} tilted {dir:?}",
            self.0
        );
        Balance(next)
    }

    /// Returns `true` if the AVL height rule holds for this balance.
    #[inline]
    pub(crate) const fn is_valid(self) -> bool {
        -1 <= self.0 && self.0 <= 1
    }

    /// Returns the side that is taller, if any.
    #[inline]
    pub(crate) const fn heavy_side(self) -> Option<Dir> {
        match self.0 {
            0 => None,
            b if b < 0 => Some(Dir::Left),
            _ => Some(Dir::Right),
        }
    }
}

impl fmt::Debug for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:+}", self.0)
    }
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaning_matches_sign() {
        assert_eq!(Balance::leaning(Dir::Left).get(), -1);
        assert_eq!(Balance::leaning(Dir::Right).get(), 1);
        assert_eq!(Balance::LEVEL.heavy_side(), None);
        assert_eq!(Balance::leaning(Dir::Left).heavy_side(), Some(Dir::Left));
    }

    #[test]
    fn tilt_reaches_transient_range() {
        let b = Balance::LEVEL.tilted(Dir::Right).tilted(Dir::Right);
        assert_eq!(b.get(), 2);
        assert!(!b.is_valid());
        assert_eq!(b.heavy_side(), Some(Dir::Right));

        let b = b.tilted(Dir::Left);
        assert!(b.is_valid());
    }

    #[test]
    #[should_panic(expected = "balance factor out of range")]
    fn tilt_past_two_panics() {
        let _ = Balance::leaning(Dir::Left)
            .tilted(Dir::Left)
            .tilted(Dir::Left);
    }
}
