// Tenant identity, context binding, and request extraction.
// Schema routing itself lives in stockify-database; this crate is
// deliberately free of any database dependency.

pub mod context;
pub mod error;
pub mod extractor;
pub mod id;
pub mod registry;
pub mod resolver;

pub use context::TenantContext;
pub use error::{ContextError, TenantIdError};
pub use extractor::{extract_from_fallbacks, extract_from_header_or_form, FallbackParts};
pub use id::TenantId;
pub use registry::TenantRegistry;
pub use resolver::TenantResolver;
