mod candidate;

pub use candidate::Candidate;
