mod voter_dto;

pub use voter_dto::*;
