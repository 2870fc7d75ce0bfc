mod position_dto;

pub use position_dto::{CreatePositionDto, PositionResponseDto, UpdatePositionDto};
