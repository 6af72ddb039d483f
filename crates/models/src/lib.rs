// Row types shared across crates. Every table exists identically in every
// tenant schema; which schema a row comes from is decided by the connection,
// never by the type.

pub mod config;
pub mod notification;
pub mod product;
pub mod user;

pub use config::TenantConfigEntry;
pub use notification::StockNotification;
pub use product::{NewProduct, Product};
pub use user::{AppUser, UserRole};
