// Export all route modules
pub mod admin;
pub mod feeds;

// Re-export all route handlers for easy importing
pub use admin::*;
pub use feeds::*;
