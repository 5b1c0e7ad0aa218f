use core::fmt;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum Rank {
    Ace = 1,
    Two = 2,
    Three = 3,
    Four = 4,
    Five = 5,
    Six = 6,
    Seven = 7,
    Eight = 8,
    Nine = 9,
    Ten = 10,
    Jack = 11,
    Queen = 12,
    King = 13,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{0} is not a card rank")]
pub struct InvalidRank(pub u8);

impl Rank {
    /// Ranks of the per-suit job piles, one per year of the plan.
    pub const JOB: [Rank; 5] = [Rank::Ace, Rank::Two, Rank::Three, Rank::Four, Rank::Five];

    /// Ranks dealt to players as workers.
    pub const WORKER: [Rank; 8] = [
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
    ];

    /// The trump jack: contributes no hours and is sent north at requisition.
    pub const DRUNKARD: Rank = Rank::Jack;
    /// The trump queen: exposes every player to requisition.
    pub const INFORMANT: Rank = Rank::Queen;
    /// The trump king: requisition takes a second card.
    pub const PARTY_OFFICIAL: Rank = Rank::King;

    pub const fn from_value(value: u8) -> Option<Self> {
        match value {
            1 => Some(Rank::Ace),
            2 => Some(Rank::Two),
            3 => Some(Rank::Three),
            4 => Some(Rank::Four),
            5 => Some(Rank::Five),
            6 => Some(Rank::Six),
            7 => Some(Rank::Seven),
            8 => Some(Rank::Eight),
            9 => Some(Rank::Nine),
            10 => Some(Rank::Ten),
            11 => Some(Rank::Jack),
            12 => Some(Rank::Queen),
            13 => Some(Rank::King),
            _ => None,
        }
    }

    pub const fn value(self) -> u8 {
        self as u8
    }

    pub const fn is_worker(self) -> bool {
        self.value() >= 6
    }

    pub const fn is_job(self) -> bool {
        self.value() <= 5
    }
}

impl TryFrom<u8> for Rank {
    type Error = InvalidRank;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Rank::from_value(value).ok_or(InvalidRank(value))
    }
}

impl From<Rank> for u8 {
    fn from(rank: Rank) -> Self {
        rank.value()
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Rank::Ace => "A",
            Rank::Two => "2",
            Rank::Three => "3",
            Rank::Four => "4",
            Rank::Five => "5",
            Rank::Six => "6",
            Rank::Seven => "7",
            Rank::Eight => "8",
            Rank::Nine => "9",
            Rank::Ten => "10",
            Rank::Jack => "J",
            Rank::Queen => "Q",
            Rank::King => "K",
        };
        f.write_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::{InvalidRank, Rank};

    #[test]
    fn from_value_maps() {
        assert_eq!(Rank::from_value(11), Some(Rank::Jack));
        assert_eq!(Rank::from_value(1), Some(Rank::Ace));
        assert_eq!(Rank::from_value(14), None);
        assert_eq!(Rank::try_from(0), Err(InvalidRank(0)));
    }

    #[test]
    fn domains_do_not_overlap() {
        assert!(Rank::JOB.iter().all(|rank| rank.is_job() && !rank.is_worker()));
        assert!(Rank::WORKER.iter().all(|rank| rank.is_worker() && !rank.is_job()));
    }

    #[test]
    fn serializes_as_number() {
        assert_eq!(serde_json::to_string(&Rank::Queen).unwrap(), "12");
        let rank: Rank = serde_json::from_str("6").unwrap();
        assert_eq!(rank, Rank::Six);
        assert!(serde_json::from_str::<Rank>("20").is_err());
    }

    #[test]
    fn display_matches_symbols() {
        assert_eq!(Rank::King.to_string(), "K");
        assert_eq!(Rank::Ten.to_string(), "10");
    }
}
