//! Elections and the commissioner access boundary.
//!
//! Owns the [`context::ElectionContext`] extractor used by every
//! election-scoped feature, the `updated_at` touch shared by their writes,
//! and the change event hub behind the SSE stream.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Auth | Description |
//! |--------|----------|------|-------------|
//! | GET | `/api/me/landing` | Yes | Dashboard entry redirect |
//! | GET | `/api/elections` | Admin | List own elections |
//! | POST | `/api/elections` | Admin | Create election |
//! | GET | `/api/elections/{election_slug}` | Commissioner | Get election |
//! | PATCH | `/api/elections/{election_slug}` | Commissioner | Update election |
//! | DELETE | `/api/elections/{election_slug}` | Commissioner | Delete election |
//! | GET | `/api/elections/{election_slug}/events` | Commissioner | SSE change stream |

pub mod context;
pub mod dtos;
pub mod events;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use context::ElectionContext;
pub use events::{ChangeAction, ChangeTarget, ElectionEvent, ElectionEvents};
pub use services::{touch_election, ElectionService};
