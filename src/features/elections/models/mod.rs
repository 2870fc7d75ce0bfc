mod election;

pub use election::Election;
