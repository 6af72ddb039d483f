pub mod auth;
pub mod health;
pub mod products;
pub mod tenant;

// Re-export common types
pub use auth::ErrorResponse;
