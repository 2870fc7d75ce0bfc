//! Voter roll of an election.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Auth | Description |
//! |--------|----------|------|-------------|
//! | GET | `/api/elections/{election_slug}/voters` | Commissioner | List voters (paginated) |
//! | POST | `/api/elections/{election_slug}/voters` | Commissioner | Add a voter |
//! | DELETE | `/api/elections/{election_slug}/voters/{voter_id}` | Commissioner | Remove a voter |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::VoterService;
