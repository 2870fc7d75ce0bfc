pub mod voter_handler;

pub use voter_handler::*;
