pub mod position_handler;

pub use position_handler::*;
