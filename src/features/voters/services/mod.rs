mod voter_service;

pub use voter_service::VoterService;
