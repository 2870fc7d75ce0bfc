mod og_dto;

pub use og_dto::*;
