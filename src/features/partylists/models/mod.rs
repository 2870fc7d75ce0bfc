mod partylist;

pub use partylist::{is_independent_abbreviation, Partylist};
