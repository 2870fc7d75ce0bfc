//! Partylists of an election.
//!
//! Every election owns an independent partylist (`IND`) created with it.
//! It cannot be edited or deleted, and no other partylist may use its
//! abbreviation. Deleting any other partylist moves its candidates to it.

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::PartylistService;
