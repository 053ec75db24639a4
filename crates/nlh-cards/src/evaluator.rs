use crate::category::Category;
use crate::combo::Combo;
use crate::kickers::Kickers;
use crate::rank::Rank;
use crate::suit::Suit;

/// Finds the best `Category` and kickers for a 5-7 card `Combo`.
///
/// The cards are never enumerated as 5-card subsets; instead every search
/// works on rank/suit bitmasks over the whole combo, which is equivalent to
/// taking the best 5-card subset but avoids the combinatorial blowup.
pub struct Evaluator(Combo);

impl From<Combo> for Evaluator {
    fn from(combo: Combo) -> Self {
        Self(combo)
    }
}

impl Evaluator {
    pub fn find_category(&self) -> Category {
        None.or_else(|| self.find_flush())
            .or_else(|| self.find_4_oak())
            .or_else(|| self.find_3_oak_2_oak())
            .or_else(|| self.find_straight())
            .or_else(|| self.find_3_oak())
            .or_else(|| self.find_2_oak_2_oak())
            .or_else(|| self.find_2_oak())
            .or_else(|| self.find_1_oak())
            .expect("a combo of 5-7 cards always resolves to a category")
    }

    pub fn find_kickers(&self, category: Category) -> Kickers {
        let n = category.n_kickers();
        if n == 0 {
            return Kickers::from(0u16);
        }
        let mut bits = category.kicker_mask() & self.rank_masks();
        while bits.count_ones() as usize > n {
            bits &= !(1 << bits.trailing_zeros());
        }
        Kickers::from(bits)
    }

    fn find_1_oak(&self) -> Option<Category> {
        self.find_rank_of_n_oak(1).map(Category::HighCard)
    }
    fn find_2_oak(&self) -> Option<Category> {
        self.find_rank_of_n_oak(2).map(Category::OnePair)
    }
    fn find_3_oak(&self) -> Option<Category> {
        self.find_rank_of_n_oak(3).map(Category::ThreeOfAKind)
    }
    fn find_4_oak(&self) -> Option<Category> {
        self.find_rank_of_n_oak(4).map(Category::FourOfAKind)
    }
    fn find_2_oak_2_oak(&self) -> Option<Category> {
        self.find_rank_of_n_oak(2).and_then(|hi| {
            self.find_rank_of_n_oak_under(2, Some(hi))
                .map(|lo| Category::TwoPair(hi, lo))
                .or(Some(Category::OnePair(hi)))
        })
    }
    fn find_3_oak_2_oak(&self) -> Option<Category> {
        self.find_rank_of_n_oak(3).and_then(|trips| {
            self.find_rank_of_n_oak_under(2, Some(trips))
                .map(|pair| Category::FullHouse(trips, pair))
        })
    }
    fn find_straight(&self) -> Option<Category> {
        self.find_rank_of_straight(self.rank_masks()).map(Category::Straight)
    }
    fn find_flush(&self) -> Option<Category> {
        self.find_suit_of_flush().and_then(|suit| {
            self.find_rank_of_straight_flush(suit)
                .map(Category::StraightFlush)
                .or_else(|| {
                    let bits = self.suit_masks()[suit as usize];
                    Some(Category::Flush(Rank::from(bits)))
                })
        })
    }

    /// Highest rank that begins a run of 5 consecutive set bits, with the
    /// wheel (A-2-3-4-5) checked separately since ace sits at the top of the
    /// bit pattern but plays low there.
    fn find_rank_of_straight(&self, mask: u16) -> Option<Rank> {
        const WHEEL: u16 = 0b_1_0000_0000_1111;
        let mut bits = mask;
        bits &= bits << 1;
        bits &= bits << 1;
        bits &= bits << 1;
        bits &= bits << 1;
        if bits > 0 {
            Some(Rank::from(bits))
        } else if mask & WHEEL == WHEEL {
            Some(Rank::Five)
        } else {
            None
        }
    }
    fn find_rank_of_straight_flush(&self, suit: Suit) -> Option<Rank> {
        let bits = self.suit_masks()[suit as usize];
        self.find_rank_of_straight(bits)
    }
    fn find_suit_of_flush(&self) -> Option<Suit> {
        self.suit_count().iter().position(|&n| n >= 5).map(|i| Suit::from(i as u8))
    }
    /// Highest rank with at least `oak` cards, searching only ranks strictly
    /// below `under` when given (used to find the second-best set for two
    /// pair / full house without re-selecting the first).
    fn find_rank_of_n_oak_under(&self, oak: usize, under: Option<Rank>) -> Option<Rank> {
        let ceiling = under.map(u8::from).unwrap_or(13) as u64;
        let combo = u64::from(self.0) & ((1u64 << (4 * ceiling)) - 1);
        let mut window = 0b_1111_u64 << (4 * ceiling) >> 4;
        while window > 0 {
            if oak <= (combo & window).count_ones() as usize {
                return Some(Rank::from((window.trailing_zeros() / 4) as u8));
            }
            window >>= 4;
        }
        None
    }
    fn find_rank_of_n_oak(&self, n: usize) -> Option<Rank> {
        self.find_rank_of_n_oak_under(n, None)
    }

    /// Which ranks are present in the combo, ignoring suit.
    fn rank_masks(&self) -> u16 {
        self.0.cards().iter().map(|c| u16::from(c.rank())).fold(0, |acc, r| acc | r)
    }
    /// How many cards of each suit are in the combo, ignoring rank.
    fn suit_count(&self) -> [u8; 4] {
        self.0.cards().iter().fold([0u8; 4], |mut counts, c| {
            counts[u8::from(c.suit()) as usize] += 1;
            counts
        })
    }
    /// Which ranks are present in the combo, grouped by suit.
    fn suit_masks(&self) -> [u16; 4] {
        self.0.cards().iter().fold([0u16; 4], |mut suits, c| {
            suits[u8::from(c.suit()) as usize] |= u16::from(c.rank());
            suits
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::Card;
    use crate::rank::Rank::*;
    use crate::suit::Suit::*;
    use crate::strength::Strength;

    fn category(cards: Vec<(crate::rank::Rank, crate::suit::Suit)>) -> Category {
        let cards: Vec<Card> = cards.into_iter().map(|(r, s)| Card::new(r, s)).collect();
        Evaluator::from(Combo::from(cards)).find_category()
    }

    #[test]
    fn high_card() {
        let hand = vec![(Ace, Spade), (King, Heart), (Queen, Diamond), (Jack, Club), (Nine, Spade)];
        assert_eq!(category(hand), Category::HighCard(Ace));
    }

    #[test]
    fn one_pair() {
        let hand = vec![(Ace, Spade), (Ace, Heart), (King, Diamond), (Queen, Club), (Jack, Spade)];
        assert_eq!(category(hand), Category::OnePair(Ace));
    }

    #[test]
    fn two_pair() {
        let hand = vec![(Ace, Spade), (Ace, Heart), (King, Diamond), (King, Club), (Queen, Spade)];
        assert_eq!(category(hand), Category::TwoPair(Ace, King));
    }

    #[test]
    fn three_of_a_kind() {
        let hand = vec![(Ace, Spade), (Ace, Heart), (Ace, Diamond), (King, Club), (Queen, Spade)];
        assert_eq!(category(hand), Category::ThreeOfAKind(Ace));
    }

    #[test]
    fn straight_broadway() {
        let hand = vec![(Ten, Spade), (Jack, Heart), (Queen, Diamond), (King, Club), (Ace, Spade)];
        assert_eq!(category(hand), Category::Straight(Ace));
    }

    #[test]
    fn wheel_straight_ranks_above_high_card_below_six_high() {
        let wheel = vec![(Ace, Spade), (Two, Heart), (Three, Diamond), (Four, Club), (Five, Spade)];
        assert_eq!(category(wheel), Category::Straight(Five));
        let six_high = vec![(Ace, Spade), (Two, Spade), (Three, Heart), (Four, Diamond), (Five, Club), (Six, Spade)];
        assert_eq!(category(six_high), Category::Straight(Six));
        let strength_wheel = Strength::from(&[
            Card::new(Ace, Spade), Card::new(Two, Heart), Card::new(Three, Diamond),
            Card::new(Four, Club), Card::new(Five, Spade),
        ][..]);
        let strength_highcard = Strength::from(&[
            Card::new(Ace, Spade), Card::new(King, Heart), Card::new(Queen, Diamond),
            Card::new(Jack, Club), Card::new(Nine, Spade),
        ][..]);
        assert!(strength_wheel > strength_highcard);
    }

    #[test]
    fn flush() {
        let hand = vec![(Ace, Spade), (King, Spade), (Queen, Spade), (Jack, Spade), (Nine, Spade)];
        assert_eq!(category(hand), Category::Flush(Ace));
    }

    #[test]
    fn full_house() {
        let hand = vec![(Ace, Spade), (Ace, Heart), (Ace, Diamond), (King, Club), (King, Spade)];
        assert_eq!(category(hand), Category::FullHouse(Ace, King));
    }

    #[test]
    fn four_of_a_kind() {
        let hand = vec![(Ace, Spade), (Ace, Heart), (Ace, Diamond), (Ace, Club), (King, Spade)];
        assert_eq!(category(hand), Category::FourOfAKind(Ace));
    }

    #[test]
    fn straight_flush() {
        let hand = vec![(Ten, Spade), (Jack, Spade), (Queen, Spade), (King, Spade), (Ace, Spade)];
        assert_eq!(category(hand), Category::StraightFlush(Ace));
    }

    #[test]
    fn seven_card_hand_takes_best_five() {
        let hand = vec![
            (Ace, Spade), (Ace, Heart), (King, Diamond), (King, Club),
            (Queen, Spade), (Jack, Heart), (Nine, Diamond),
        ];
        assert_eq!(category(hand), Category::TwoPair(Ace, King));
    }

    #[test]
    fn flush_beats_straight() {
        let hand = vec![
            (Four, Heart), (Six, Heart), (Seven, Heart), (Eight, Heart), (Nine, Heart), (Ten, Spade),
        ];
        assert_eq!(category(hand), Category::Flush(Nine));
    }

    #[test]
    fn full_house_beats_flush() {
        let hand = vec![
            (Ace, Spade), (Ace, Heart), (Ace, Diamond),
            (King, Spade), (King, Heart), (Queen, Spade), (Jack, Spade),
        ];
        assert_eq!(category(hand), Category::FullHouse(Ace, King));
    }

    #[test]
    fn straight_flush_beats_four_of_a_kind() {
        let hand = vec![
            (Ten, Spade), (Jack, Spade), (Queen, Spade), (King, Spade), (Ace, Spade),
            (Ace, Heart), (Ace, Diamond),
        ];
        assert_eq!(category(hand), Category::StraightFlush(Ace));
    }

    #[test]
    fn ties_have_equal_strength_and_ordering_matches_category_rank() {
        let a = Strength::from(&[
            Card::new(Ace, Spade), Card::new(Ace, Heart), Card::new(King, Diamond),
            Card::new(Queen, Club), Card::new(Jack, Spade),
        ][..]);
        let b = Strength::from(&[
            Card::new(Ace, Diamond), Card::new(Ace, Club), Card::new(King, Spade),
            Card::new(Queen, Heart), Card::new(Jack, Diamond),
        ][..]);
        assert_eq!(a, b);
        assert_eq!(a.score(), b.score());

        let flush = Strength::from(&[
            (Ace, Spade), (King, Spade), (Queen, Spade), (Jack, Spade), (Nine, Spade),
        ].map(|(r, s)| Card::new(r, s))[..]);
        assert!(flush > a);
        assert_ne!(flush.score(), a.score());
    }
}
