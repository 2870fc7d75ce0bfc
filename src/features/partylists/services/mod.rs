mod partylist_service;

pub use partylist_service::{plan_partylist_update, PartylistPatch, PartylistService, PartylistUpdate};
