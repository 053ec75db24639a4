/// The kicker ranks that break a tie within one `Category`.
///
/// Stored as the same rank bitmask the evaluator already works in, so
/// comparing kickers is a plain integer comparison: a higher set bit always
/// outranks a lower one regardless of how many bits are set.
#[derive(Debug, Clone, Copy, Eq, PartialEq, PartialOrd, Ord, Hash)]
pub struct Kickers(u16);

impl From<u16> for Kickers {
    fn from(bits: u16) -> Self {
        Self(bits)
    }
}
impl From<Kickers> for u16 {
    fn from(k: Kickers) -> u16 {
        k.0
    }
}

impl std::fmt::Display for Kickers {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:013b}", self.0)
    }
}
