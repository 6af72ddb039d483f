use crate::context::TenantContext;
use crate::id::TenantId;
use crate::registry::TenantRegistry;

/// Resolves the tenant a unit of work should execute against.
///
/// Never yields an absent identifier: an unbound context resolves to the
/// registry's default tenant. The database layer relies on this to pick a
/// schema for every connection checkout; because pooled connections are
/// reused across units of work, the provider re-asserts the schema on every
/// checkout instead of trusting any cached state.
#[derive(Debug, Clone)]
pub struct TenantResolver {
    default_tenant: TenantId,
}

impl TenantResolver {
    pub fn new(registry: &TenantRegistry) -> Self {
        Self {
            default_tenant: registry.default_tenant().clone(),
        }
    }

    pub fn resolve(&self, ctx: &TenantContext) -> TenantId {
        let resolved = ctx
            .current()
            .unwrap_or_else(|| self.default_tenant.clone());
        tracing::trace!(tenant = %resolved, "Resolved tenant identifier");
        resolved
    }

    pub fn default_tenant(&self) -> &TenantId {
        &self.default_tenant
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> TenantResolver {
        let registry = TenantRegistry::new(
            vec![TenantId::new("acme_corp").unwrap()],
            TenantId::new("public").unwrap(),
            TenantId::new("stockify").unwrap(),
        );
        TenantResolver::new(&registry)
    }

    #[test]
    fn unbound_context_resolves_to_default() {
        let ctx = TenantContext::new();
        assert_eq!(resolver().resolve(&ctx).as_str(), "public");
    }

    #[test]
    fn bound_context_resolves_to_binding() {
        let ctx = TenantContext::new();
        ctx.bind(TenantId::new("acme_corp").unwrap()).unwrap();
        assert_eq!(resolver().resolve(&ctx).as_str(), "acme_corp");
    }

    #[test]
    fn resolution_after_clear_falls_back() {
        let ctx = TenantContext::new();
        ctx.bind(TenantId::new("acme_corp").unwrap()).unwrap();
        ctx.clear();
        assert_eq!(resolver().resolve(&ctx).as_str(), "public");
    }
}
