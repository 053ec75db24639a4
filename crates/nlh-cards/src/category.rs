use crate::rank::Rank;

/// The ten poker hand categories, ordered worst-to-best by derived `Ord`.
///
/// Each variant carries the rank(s) that distinguish it from other hands of the
/// same category before kickers are consulted (e.g. the pair rank in `OnePair`,
/// or the trips-then-pair ranks in `FullHouse`).
#[derive(Debug, Clone, Copy, Eq, PartialEq, PartialOrd, Ord)]
pub enum Category {
    HighCard(Rank),
    OnePair(Rank),
    TwoPair(Rank, Rank),
    ThreeOfAKind(Rank),
    Straight(Rank),
    Flush(Rank),
    FullHouse(Rank, Rank),
    FourOfAKind(Rank),
    StraightFlush(Rank),
}

impl Category {
    /// How many kicker cards (beyond the ranks already named above) break a
    /// tie within this category.
    pub fn n_kickers(&self) -> usize {
        match self {
            Category::HighCard(_) => 4,
            Category::OnePair(_) => 3,
            Category::ThreeOfAKind(_) => 2,
            Category::FourOfAKind(_) | Category::TwoPair(_, _) => 1,
            _ => 0,
        }
    }

    /// Bitmask of ranks excluded from kicker selection: the ranks this
    /// category already accounts for.
    pub fn kicker_mask(&self) -> u16 {
        match *self {
            Category::TwoPair(hi, lo) => !(u16::from(hi) | u16::from(lo)),
            Category::HighCard(hi)
            | Category::OnePair(hi)
            | Category::FourOfAKind(hi)
            | Category::ThreeOfAKind(hi) => !u16::from(hi),
            Category::FullHouse(..)
            | Category::StraightFlush(..)
            | Category::Straight(..)
            | Category::Flush(..) => unreachable!("category carries no kickers"),
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Category::HighCard(r) => write!(f, "HIGH_CARD {}", r),
            Category::OnePair(r) => write!(f, "ONE_PAIR {}", r),
            Category::TwoPair(hi, lo) => write!(f, "TWO_PAIR {}{}", hi, lo),
            Category::ThreeOfAKind(r) => write!(f, "THREE_OF_A_KIND {}", r),
            Category::Straight(r) => write!(f, "STRAIGHT {}", r),
            Category::Flush(r) => write!(f, "FLUSH {}", r),
            Category::FullHouse(hi, lo) => write!(f, "FULL_HOUSE {}{}", hi, lo),
            Category::FourOfAKind(r) => write!(f, "FOUR_OF_A_KIND {}", r),
            Category::StraightFlush(r) if *r == Rank::Ace => write!(f, "ROYAL_FLUSH"),
            Category::StraightFlush(r) => write!(f, "STRAIGHT_FLUSH {}", r),
        }
    }
}
