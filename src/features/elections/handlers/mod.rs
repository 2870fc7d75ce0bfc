pub mod election_handler;
pub mod event_handler;

pub use election_handler::*;
pub use event_handler::*;
