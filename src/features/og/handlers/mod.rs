pub mod og_handler;

pub use og_handler::*;
