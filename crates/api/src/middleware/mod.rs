pub mod guard;
pub mod tenant;

pub use guard::tenant_guard;
pub use tenant::{tenant_binding, tenant_fallback};
