use crate::rank::Rank;
use crate::suit::Suit;
use std::fmt::{Display, Formatter, Result};

/// A single playing card, encoded as a `(Rank, Suit)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Card {
    rank: Rank,
    suit: Suit,
}

impl Card {
    pub fn new(rank: Rank, suit: Suit) -> Self {
        Self { rank, suit }
    }
    pub fn rank(&self) -> Rank {
        self.rank
    }
    pub fn suit(&self) -> Suit {
        self.suit
    }
    /// Position of this card's bit in a 52-bit `Hand` mask.
    pub fn to_bits(&self) -> u64 {
        1 << u8::from(*self)
    }
    /// The two-character wire code, e.g. `"Ah"`.
    pub fn code(&self) -> String {
        self.to_string()
    }
}

impl From<Card> for u8 {
    fn from(c: Card) -> u8 {
        (c.rank as u8) * 4 + (c.suit as u8)
    }
}
impl From<u8> for Card {
    fn from(n: u8) -> Self {
        Self {
            rank: Rank::from(n / 4),
            suit: Suit::from(n % 4),
        }
    }
}
impl From<Card> for u64 {
    fn from(c: Card) -> u64 {
        1 << u8::from(c)
    }
}

impl Display for Card {
    fn fmt(&self, f: &mut Formatter) -> Result {
        write!(f, "{}{}", self.rank, self.suit)
    }
}

impl TryFrom<&str> for Card {
    type Error = anyhow::Error;
    fn try_from(s: &str) -> std::result::Result<Self, Self::Error> {
        let mut chars = s.chars();
        let rank = chars
            .next()
            .ok_or_else(|| anyhow::anyhow!("empty card code"))?;
        let suit = chars
            .next()
            .ok_or_else(|| anyhow::anyhow!("card code missing suit"))?;
        if chars.next().is_some() {
            return Err(anyhow::anyhow!("card code '{s}' longer than two characters"));
        }
        Ok(Self::new(Rank::try_from(rank)?, Suit::try_from(suit)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_roundtrip() {
        for n in 0..52u8 {
            let card = Card::from(n);
            let code = card.code();
            let parsed = Card::try_from(code.as_str()).unwrap();
            assert_eq!(u8::from(card), u8::from(parsed));
        }
    }

    #[test]
    fn display_matches_expected_codes() {
        assert_eq!(Card::new(Rank::Ace, Suit::Spade).code(), "As");
        assert_eq!(Card::new(Rank::Ten, Suit::Heart).code(), "Th");
    }
}
