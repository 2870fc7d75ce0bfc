//! Candidates of an election.
//!
//! The editor submission is the involved part: [`submission`] decides what
//! a draft changes, [`photo`] stages the uploaded photo around the database
//! write, and [`credentials`] holds the credential list editing rules.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Auth | Description |
//! |--------|----------|------|-------------|
//! | GET | `/api/elections/{election_slug}/candidates` | Commissioner | List candidates |
//! | POST | `/api/elections/{election_slug}/candidates` | Commissioner | Add candidate |
//! | GET | `/api/elections/{election_slug}/candidates/{candidate_id}` | Commissioner | Get candidate |
//! | PUT | `/api/elections/{election_slug}/candidates/{candidate_id}` | Commissioner | Submit editor (multipart) |
//! | DELETE | `/api/elections/{election_slug}/candidates/{candidate_id}` | Commissioner | Delete candidate |

pub mod credentials;
pub mod dtos;
pub mod handlers;
pub mod models;
pub mod photo;
pub mod routes;
pub mod services;
pub mod submission;

pub use services::CandidateService;
