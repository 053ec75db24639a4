use crate::category::Category;
use crate::evaluator::Evaluator;
use crate::kickers::Kickers;

/// A hand's total-order evaluation score.
///
/// Two hands tie iff their `Strength` is equal; otherwise `Ord` matches
/// standard poker rules. `category` dominates the comparison and `kickers`
/// only matters within a category, which is exactly the field order needed
/// for the derived `Ord` to do the right thing.
#[derive(Debug, Clone, Copy, Eq, PartialEq, PartialOrd, Ord)]
pub struct Strength {
    category: Category,
    kickers: Kickers,
}

impl Strength {
    pub fn category(&self) -> Category {
        self.category
    }

    /// A single `u32` that totally orders every possible `Strength`, for
    /// callers that want an integer rather than a struct to compare or log.
    pub fn score(&self) -> u32 {
        let category_rank = match self.category {
            Category::HighCard(_) => 0u32,
            Category::OnePair(_) => 1,
            Category::TwoPair(..) => 2,
            Category::ThreeOfAKind(_) => 3,
            Category::Straight(_) => 4,
            Category::Flush(_) => 5,
            Category::FullHouse(..) => 6,
            Category::FourOfAKind(_) => 7,
            Category::StraightFlush(_) => 8,
        };
        (category_rank << 21) | (self.category_bits() << 13) | (u16::from(self.kickers) as u32)
    }

    /// Primary/secondary rank indices packed as `(hi << 4) | lo`, 8 bits total.
    fn category_bits(&self) -> u32 {
        let idx = |r: crate::rank::Rank| u8::from(r) as u32;
        match self.category {
            Category::HighCard(r)
            | Category::OnePair(r)
            | Category::ThreeOfAKind(r)
            | Category::Straight(r)
            | Category::Flush(r)
            | Category::FourOfAKind(r)
            | Category::StraightFlush(r) => idx(r),
            Category::TwoPair(hi, lo) | Category::FullHouse(hi, lo) => (idx(hi) << 4) | idx(lo),
        }
    }
}

impl From<Evaluator> for Strength {
    fn from(e: Evaluator) -> Self {
        let category = e.find_category();
        let kickers = e.find_kickers(category);
        Self { category, kickers }
    }
}
impl From<crate::combo::Combo> for Strength {
    fn from(combo: crate::combo::Combo) -> Self {
        Self::from(Evaluator::from(combo))
    }
}
impl From<&[crate::card::Card]> for Strength {
    fn from(cards: &[crate::card::Card]) -> Self {
        Self::from(crate::combo::Combo::from(cards))
    }
}

impl std::fmt::Display for Strength {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:<20}{}", self.category, self.kickers)
    }
}
