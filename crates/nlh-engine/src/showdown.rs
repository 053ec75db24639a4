use crate::pot::Pot;
use nlh_cards::Strength;
use nlh_core::{Chips, Position};
use std::collections::BTreeMap;

/// Awards each pot to its best eligible hand(s) and returns the total won by
/// every seat named in at least one pot.
///
/// `strengths` gives every non-folded seat's best 5-card evaluation;
/// folded seats are absent and can never be awarded anything. `button` is
/// used only to break odd-chip ties in a stable clockwise order.
pub struct ShowdownResolver;

impl ShowdownResolver {
    pub fn resolve(
        pots: &[Pot],
        strengths: &BTreeMap<Position, Strength>,
        seats_clockwise_from_button: &[Position],
    ) -> BTreeMap<Position, Chips> {
        let mut winnings: BTreeMap<Position, Chips> = BTreeMap::new();
        for pot in pots {
            let contenders: Vec<Position> =
                pot.eligible.iter().copied().filter(|s| strengths.contains_key(s)).collect();

            let winners = if contenders.is_empty() {
                // Every eligible seat folded after committing to this pot:
                // award to the first non-folded seat by seat order from the button.
                seats_clockwise_from_button
                    .iter()
                    .copied()
                    .find(|s| strengths.contains_key(s))
                    .into_iter()
                    .collect()
            } else {
                let best = contenders.iter().map(|s| strengths[s]).max().expect("non-empty");
                contenders.into_iter().filter(|s| strengths[s] == best).collect()
            };

            if winners.is_empty() {
                continue;
            }
            let share = pot.amount / winners.len() as Chips;
            let mut remainder = pot.amount % winners.len() as Chips;

            // Distribute shares, then hand out odd chips one at a time in
            // ascending seat order starting from the button.
            let mut ordered = winners.clone();
            ordered.sort_by_key(|s| clockwise_rank(seats_clockwise_from_button, *s));
            for seat in &ordered {
                *winnings.entry(*seat).or_insert(0) += share;
            }
            for seat in ordered.iter() {
                if remainder == 0 {
                    break;
                }
                *winnings.entry(*seat).or_insert(0) += 1;
                remainder -= 1;
            }
        }
        winnings
    }
}

fn clockwise_rank(order: &[Position], seat: Position) -> usize {
    order.iter().position(|s| *s == seat).unwrap_or(usize::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nlh_cards::{Card, Category, Rank, Suit};

    fn strength(category: Category) -> Strength {
        // Build a real Strength via the evaluator for each scenario below
        // rather than constructing one directly (no public constructor).
        use nlh_cards::{Combo, Evaluator};
        let cards: Vec<Card> = match category {
            Category::HighCard(Rank::Ace) => vec![
                Card::new(Rank::Ace, Suit::Spade), Card::new(Rank::King, Suit::Heart),
                Card::new(Rank::Queen, Suit::Diamond), Card::new(Rank::Jack, Suit::Club),
                Card::new(Rank::Nine, Suit::Spade),
            ],
            Category::OnePair(Rank::Ace) => vec![
                Card::new(Rank::Ace, Suit::Spade), Card::new(Rank::Ace, Suit::Heart),
                Card::new(Rank::King, Suit::Diamond), Card::new(Rank::Queen, Suit::Club),
                Card::new(Rank::Jack, Suit::Spade),
            ],
            _ => unreachable!("test helper covers only the categories exercised below"),
        };
        Strength::from(Evaluator::from(Combo::from(cards)))
    }

    #[test]
    fn single_pot_single_winner() {
        let pots = vec![Pot { amount: 300, eligible: [0, 1, 2].into() }];
        let strengths = BTreeMap::from([
            (0, strength(Category::OnePair(Rank::Ace))),
            (1, strength(Category::HighCard(Rank::Ace))),
            (2, strength(Category::HighCard(Rank::Ace))),
        ]);
        let winnings = ShowdownResolver::resolve(&pots, &strengths, &[0, 1, 2]);
        assert_eq!(winnings.get(&0), Some(&300));
        assert_eq!(winnings.get(&1), None);
    }

    #[test]
    fn split_pot_divides_evenly_and_assigns_odd_chip_from_button() {
        let pots = vec![Pot { amount: 301, eligible: [0, 1, 2].into() }];
        let tie = strength(Category::HighCard(Rank::Ace));
        let strengths = BTreeMap::from([(0, tie), (2, tie)]);
        // button order starting from seat 1 (clockwise): 1, 2, 0
        let winnings = ShowdownResolver::resolve(&pots, &strengths, &[1, 2, 0]);
        assert_eq!(winnings.values().sum::<Chips>(), 301);
        assert_eq!(winnings[&2], 151); // seat 2 is first in clockwise order among winners
        assert_eq!(winnings[&0], 150);
    }

    #[test]
    fn side_pot_awarded_independently_of_main_pot() {
        let main = Pot { amount: 300, eligible: [0, 1, 2].into() };
        let side = Pot { amount: 800, eligible: [1, 2].into() };
        let strengths = BTreeMap::from([
            (0, strength(Category::OnePair(Rank::Ace))), // best overall, only eligible for main
            (1, strength(Category::HighCard(Rank::Ace))),
            (2, strength(Category::HighCard(Rank::Ace))),
        ]);
        let winnings = ShowdownResolver::resolve(&[main, side], &strengths, &[0, 1, 2]);
        assert_eq!(winnings[&0], 300);
        // seats 1 and 2 tie for the side pot
        assert_eq!(winnings[&1] + winnings[&2], 800);
    }
}
