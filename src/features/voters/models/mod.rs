mod voter;

pub use voter::Voter;
