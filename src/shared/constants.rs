/// Default page size for pagination
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Maximum page size allowed
pub const MAX_PAGE_SIZE: i64 = 100;

// =============================================================================
// ROLE CONSTANTS
// =============================================================================

/// Commissioner role - grants election management regardless of account type
pub const ROLE_COMMISSIONER: &str = "commissioner";

// =============================================================================
// PARTYLIST CONSTANTS
// =============================================================================

/// Abbreviation of the independent partylist every election starts with
pub const INDEPENDENT_ABBREVIATION: &str = "IND";

/// Display name of the independent partylist
pub const INDEPENDENT_NAME: &str = "Independent";

// =============================================================================
// CHANGE EVENTS
// =============================================================================

/// Capacity of the per-process election change broadcast channel
pub const EVENT_CHANNEL_CAPACITY: usize = 256;
