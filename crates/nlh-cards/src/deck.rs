use crate::card::Card;
use rand::seq::SliceRandom;

/// The 52-card multiset plus a deal pointer.
///
/// `cards` holds every card not yet dealt; `deal` pops from the back, so the
/// last position in `cards` is always "the next card to come off the deck".
#[derive(Debug, Clone)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Default for Deck {
    fn default() -> Self {
        Self::new()
    }
}

impl Deck {
    /// A fresh, shuffled 52-card deck.
    pub fn new() -> Self {
        let mut deck = Self {
            cards: (0..52).map(Card::from).collect(),
        };
        deck.shuffle();
        deck
    }

    /// Re-shuffles the full 52-card domain and resets the deal pointer.
    pub fn shuffle(&mut self) {
        self.cards = (0..52).map(Card::from).collect();
        let mut rng = rand::rng();
        self.cards.shuffle(&mut rng);
    }

    /// Deals `n` cards, advancing the pointer. Fails if fewer than `n` remain.
    pub fn deal(&mut self, n: usize) -> anyhow::Result<Vec<Card>> {
        if self.cards.len() < n {
            return Err(anyhow::anyhow!(
                "cannot deal {n} cards, only {} remain",
                self.cards.len()
            ));
        }
        Ok((0..n).filter_map(|_| self.cards.pop()).collect())
    }

    /// Removes the given cards from the deck (known-card simulations) and
    /// re-shuffles the remainder, resetting the pointer.
    pub fn remove_all(&mut self, cards: &[Card]) {
        self.cards = (0..52)
            .map(Card::from)
            .filter(|c| !cards.contains(c))
            .collect();
        let mut rng = rand::rng();
        self.cards.shuffle(&mut rng);
    }

    pub fn remaining(&self) -> usize {
        self.cards.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deal_advances_pointer_and_has_no_duplicates() {
        let mut deck = Deck::new();
        let mut seen = std::collections::HashSet::new();
        let hole = deck.deal(2).unwrap();
        let board = deck.deal(5).unwrap();
        for card in hole.iter().chain(board.iter()) {
            assert!(seen.insert(u8::from(*card)), "duplicate card dealt");
        }
        assert_eq!(deck.remaining(), 52 - 7);
    }

    #[test]
    fn deal_fails_when_exhausted() {
        let mut deck = Deck::new();
        assert!(deck.deal(53).is_err());
    }

    #[test]
    fn remove_all_excludes_given_cards() {
        let mut deck = Deck::new();
        let blocked = vec![Card::from(0), Card::from(1)];
        deck.remove_all(&blocked);
        assert_eq!(deck.remaining(), 50);
        let dealt = deck.deal(50).unwrap();
        assert!(!dealt.iter().any(|c| blocked.contains(c)));
    }
}
