use crate::card::Card;

/// A set of 5-7 cards packed as a 52-bit mask, one bit per card index.
///
/// The bitmask representation lets the evaluator search for the best category
/// with shifts and masks instead of sorting and grouping a `Vec<Card>`.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub struct Combo(u64);

impl From<&[Card]> for Combo {
    fn from(cards: &[Card]) -> Self {
        Self(cards.iter().fold(0u64, |acc, c| acc | c.to_bits()))
    }
}
impl From<Vec<Card>> for Combo {
    fn from(cards: Vec<Card>) -> Self {
        Self::from(cards.as_slice())
    }
}
impl From<Combo> for u64 {
    fn from(combo: Combo) -> u64 {
        combo.0
    }
}

impl Combo {
    pub fn cards(&self) -> Vec<Card> {
        (0..52u8).filter(|n| self.0 & (1 << n) != 0).map(Card::from).collect()
    }
    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}
