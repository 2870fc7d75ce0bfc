mod partylist_dto;

pub use partylist_dto::{CreatePartylistDto, PartylistResponseDto, UpdatePartylistDto};
