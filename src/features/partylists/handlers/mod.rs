pub mod partylist_handler;

pub use partylist_handler::*;
