pub mod auth;
pub mod candidates;
pub mod elections;
pub mod og;
pub mod partylists;
pub mod positions;
pub mod voters;
