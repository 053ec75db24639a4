use nlh_core::{Chips, Position};
use std::collections::BTreeSet;

/// One main or side pot: the chips in it and the seats eligible to win it.
/// Folded contributors' chips still count toward `amount`, but a
/// folded seat is never in `eligible`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pot {
    pub amount: Chips,
    pub eligible: BTreeSet<Position>,
}

/// One seat's contribution to the pot for the purpose of pot calculation.
#[derive(Debug, Clone, Copy)]
pub struct Contribution {
    pub seat: Position,
    pub bet_total: Chips,
    pub folded: bool,
}

/// Partitions all contributions into main + side pots.
///
/// Sorts contributors by `bet_total` ascending and forms one pot per
/// distinct contribution level: the chips between the previous level and
/// this one, times the number of players who contributed at least this
/// much, are eligible to every non-folded player at or above this level.
pub struct PotCalculator;

impl PotCalculator {
    pub fn calculate(contributions: &[Contribution]) -> Vec<Pot> {
        let mut levels: Vec<Chips> = contributions.iter().map(|c| c.bet_total).collect();
        levels.sort_unstable();
        levels.dedup();

        let mut pots = Vec::new();
        let mut previous = 0;
        for level in levels {
            if level == previous {
                continue;
            }
            let at_or_above: Vec<&Contribution> =
                contributions.iter().filter(|c| c.bet_total >= level).collect();
            let amount = (level - previous) * at_or_above.len() as Chips;
            if amount == 0 {
                previous = level;
                continue;
            }
            let eligible = at_or_above
                .iter()
                .filter(|c| !c.folded)
                .map(|c| c.seat)
                .collect::<BTreeSet<_>>();
            pots.push(Pot { amount, eligible });
            previous = level;
        }
        pots
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(seat: Position, bet_total: Chips, folded: bool) -> Contribution {
        Contribution { seat, bet_total, folded }
    }

    #[test]
    fn no_side_pot_when_contributions_equal() {
        let pots = PotCalculator::calculate(&[c(0, 100, false), c(1, 100, false), c(2, 100, false)]);
        assert_eq!(pots.len(), 1);
        assert_eq!(pots[0].amount, 300);
        assert_eq!(pots[0].eligible, BTreeSet::from([0, 1, 2]));
    }

    #[test]
    fn side_pot_for_short_all_in() {
        // seat 0 all-in for 100, seats 1 and 2 committed 500 each.
        let pots = PotCalculator::calculate(&[c(0, 100, false), c(1, 500, false), c(2, 500, false)]);
        assert_eq!(pots.len(), 2);
        assert_eq!(pots[0].amount, 300); // 100 * 3
        assert_eq!(pots[0].eligible, BTreeSet::from([0, 1, 2]));
        assert_eq!(pots[1].amount, 800); // 400 * 2
        assert_eq!(pots[1].eligible, BTreeSet::from([1, 2]));
    }

    #[test]
    fn folded_contribution_counts_toward_pot_but_not_eligibility() {
        let pots = PotCalculator::calculate(&[c(0, 50, true), c(1, 100, false), c(2, 100, false)]);
        assert_eq!(pots.len(), 2);
        assert_eq!(pots[0].amount, 150); // 50 * 3, seat 0 folded but still contributed
        assert_eq!(pots[0].eligible, BTreeSet::from([1, 2]));
        assert_eq!(pots[1].amount, 100); // 50 * 2
        assert_eq!(pots[1].eligible, BTreeSet::from([1, 2]));
    }

    #[test]
    fn total_chips_conserved() {
        let contributions = [c(0, 30, false), c(1, 75, true), c(2, 200, false), c(3, 200, false)];
        let pots = PotCalculator::calculate(&contributions);
        let total: Chips = contributions.iter().map(|c| c.bet_total).sum();
        assert_eq!(pots.iter().map(|p| p.amount).sum::<Chips>(), total);
    }
}
