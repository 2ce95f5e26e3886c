//! Shared constants for end-to-end tests
//!
//! When test data changes (account credentials, post ids, etc.),
//! update only this file.

// ============================================================================
// Test Account Credentials
// ============================================================================

/// Regular test account handle
pub const TEST_USER: &str = "testuser";

/// Regular test account password
pub const TEST_PASS: &str = "testpass123";

/// Admin test account handle
pub const ADMIN_USER: &str = "admin";

/// Admin test account password
pub const ADMIN_PASS: &str = "adminpass123";

// ============================================================================
// Site
// ============================================================================

pub const SITE_TITLE: &str = "Test Blog";

/// Cookie derived from SITE_TITLE
pub const READ_POSTS_COOKIE: &str = "test-blog-up_read_posts";

/// Account metadata key of the persistent read state
pub const READ_POSTS_META_KEY: &str = "up_read_posts";

// ============================================================================
// Test Content
// ============================================================================

pub const POST_3_ID: u64 = 3;
pub const POST_3_TITLE: &str = "Getting Started";

pub const POST_5_ID: u64 = 5;
pub const POST_5_TITLE: &str = "Second Steps";

pub const POST_7_ID: u64 = 7;
pub const POST_7_TITLE: &str = "Fish & Chips";

pub const POST_9_ID: u64 = 9;
pub const POST_9_TITLE: &str = "Latest News";

/// Published posts, newest first
pub const PUBLISHED_POST_IDS: [u64; 4] = [POST_9_ID, POST_7_ID, POST_5_ID, POST_3_ID];

/// Unpublished post
pub const DRAFT_ID: u64 = 11;

/// Published post of type "page"
pub const PAGE_ID: u64 = 12;
pub const PAGE_TITLE: &str = "About";

/// Id with no post
pub const MISSING_POST_ID: u64 = 404;

// ============================================================================
// Timeouts
// ============================================================================

/// Maximum time to wait for the server to accept requests (milliseconds)
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Timeout for individual HTTP requests (seconds)
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Polling interval when waiting for server ready (milliseconds)
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 50;
