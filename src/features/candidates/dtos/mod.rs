mod candidate_dto;

pub use candidate_dto::{
    photo_extension, CandidateQueryParams, CandidateResponseDto, CreateCandidateDto,
    UpdateCandidateDto, UpdateCandidateForm, ALLOWED_PHOTO_TYPES, MAX_PHOTO_SIZE,
};
