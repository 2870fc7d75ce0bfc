mod election_service;

pub use election_service::{admin_landing_path, prepare_slug, touch_election, ElectionService};
