mod election_dto;

pub use election_dto::{
    CreateElectionDto, ElectionResponseDto, LandingResponseDto, UpdateElectionDto,
};
