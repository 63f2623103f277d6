//! Application-wide constants
//!
//! This module contains all constant values used throughout the application.
//! Constants are grouped by their purpose for better organization.

// =============================================================================
// SERVER DEFAULTS
// =============================================================================

/// Default server host address
pub const DEFAULT_SERVER_HOST: &str = "0.0.0.0";

/// Default server port
pub const DEFAULT_SERVER_PORT: u16 = 8080;

/// Default per-request timeout in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Maximum accepted request body size in bytes (1 MB)
pub const MAX_REQUEST_BODY_BYTES: usize = 1024 * 1024;

// =============================================================================
// DATABASE DEFAULTS
// =============================================================================

/// Default maximum database connections in the pool
pub const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 20;

// =============================================================================
// AUTHENTICATION DEFAULTS
// =============================================================================

/// Default JWT token expiry in hours
pub const DEFAULT_JWT_EXPIRY_HOURS: i64 = 24;

/// Minimum password length
pub const MIN_PASSWORD_LENGTH: u64 = 8;

/// Maximum password length
pub const MAX_PASSWORD_LENGTH: u64 = 128;

/// Maximum length of first/last names, emails, titles and locations
pub const MAX_NAME_LENGTH: u64 = 255;

/// Maximum phone number length
pub const MAX_PHONE_LENGTH: u64 = 20;

// =============================================================================
// REGISTRATION RULES
// =============================================================================

/// Registrations can no longer be cancelled this many minutes before the event starts
pub const DEFAULT_CANCELLATION_CUTOFF_MINUTES: i64 = 60;

// =============================================================================
// USER ROLES
// =============================================================================

/// Role names as seeded in the `roles` table
pub mod roles {
    pub const STUDENT: &str = "student";
    pub const ORGANIZER: &str = "organizer";
    pub const ADMIN: &str = "admin";

    /// Roles allowed to manage events and other users' registrations
    pub const STAFF: &[&str] = &[ORGANIZER, ADMIN];
}

// =============================================================================
// API
// =============================================================================

/// API base path
pub const API_BASE_PATH: &str = "/api";

// =============================================================================
// RATE LIMITING
// =============================================================================

/// Rate limiting configuration
pub mod rate_limits {
    /// Auth endpoint - max requests
    pub const AUTH_MAX_REQUESTS: i64 = 5;
    /// Auth endpoint - window in seconds
    pub const AUTH_WINDOW_SECS: i64 = 60;

    /// Registration endpoints - max requests
    pub const REGISTRATION_MAX_REQUESTS: i64 = 20;
    /// Registration endpoints - window in seconds
    pub const REGISTRATION_WINDOW_SECS: i64 = 60;

    /// General API - max requests
    pub const GENERAL_MAX_REQUESTS: i64 = 100;
    /// General API - window in seconds
    pub const GENERAL_WINDOW_SECS: i64 = 60;
}

// =============================================================================
// PAGINATION
// =============================================================================

/// Page size for event listings
pub const EVENTS_PAGE_SIZE: u32 = 15;

/// Page size for user and registration listings
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Maximum page size for paginated results
pub const MAX_PAGE_SIZE: u32 = 100;

/// Number of recent items shown on a user profile
pub const PROFILE_RECENT_ITEMS: i64 = 5;
