pub mod card;
pub mod deck;
pub mod hand;
pub mod player;
pub mod plot;
pub mod rank;
pub mod suit;
pub mod suit_map;
pub mod trick;
