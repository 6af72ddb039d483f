use crate::id::TenantId;
use crate::error::TenantIdError;

const DEFAULT_TENANTS: &str = "public,stockify,acme_corp,global_trade,artisan_crafts,tech_solutions";
const DEFAULT_DEFAULT_TENANT: &str = "public";
const DEFAULT_PLATFORM_TENANT: &str = "stockify";

/// Static, boot-time configured set of known tenants.
///
/// Two tenants are distinguished: the *default* tenant, which the resolver
/// falls back to and which pooled connections are reset to, and the
/// *platform* tenant, which receives the global superadmin account during
/// seeding. They may be the same tenant.
#[derive(Debug, Clone)]
pub struct TenantRegistry {
    tenants: Vec<TenantId>,
    default_tenant: TenantId,
    platform_tenant: TenantId,
}

impl TenantRegistry {
    pub fn new(
        tenants: Vec<TenantId>,
        default_tenant: TenantId,
        platform_tenant: TenantId,
    ) -> Self {
        let mut tenants = tenants;
        for distinguished in [&default_tenant, &platform_tenant] {
            if !tenants.contains(distinguished) {
                tenants.push(distinguished.clone());
            }
        }
        Self {
            tenants,
            default_tenant,
            platform_tenant,
        }
    }

    pub fn from_env() -> Result<Self, TenantIdError> {
        let raw_tenants =
            std::env::var("STOCKIFY_TENANTS").unwrap_or_else(|_| DEFAULT_TENANTS.to_string());
        let tenants = raw_tenants
            .split(',')
            .filter(|s| !s.trim().is_empty())
            .map(TenantId::new)
            .collect::<Result<Vec<_>, _>>()?;
        let default_tenant = TenantId::new(
            &std::env::var("STOCKIFY_DEFAULT_TENANT")
                .unwrap_or_else(|_| DEFAULT_DEFAULT_TENANT.to_string()),
        )?;
        let platform_tenant = TenantId::new(
            &std::env::var("STOCKIFY_PLATFORM_TENANT")
                .unwrap_or_else(|_| DEFAULT_PLATFORM_TENANT.to_string()),
        )?;
        Ok(Self::new(tenants, default_tenant, platform_tenant))
    }

    pub fn tenants(&self) -> &[TenantId] {
        &self.tenants
    }

    pub fn default_tenant(&self) -> &TenantId {
        &self.default_tenant
    }

    pub fn platform_tenant(&self) -> &TenantId {
        &self.platform_tenant
    }

    pub fn contains(&self, id: &TenantId) -> bool {
        self.tenants.contains(id)
    }

    pub fn is_default(&self, id: &TenantId) -> bool {
        *id == self.default_tenant
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> TenantRegistry {
        TenantRegistry::new(
            vec![
                TenantId::new("public").unwrap(),
                TenantId::new("acme_corp").unwrap(),
            ],
            TenantId::new("public").unwrap(),
            TenantId::new("stockify").unwrap(),
        )
    }

    #[test]
    fn distinguished_tenants_are_always_members() {
        let reg = registry();
        assert!(reg.contains(&TenantId::new("public").unwrap()));
        assert!(reg.contains(&TenantId::new("stockify").unwrap()));
        assert_eq!(reg.tenants().len(), 3);
    }

    #[test]
    fn membership_and_default() {
        let reg = registry();
        assert!(reg.contains(&TenantId::new("ACME-Corp").unwrap()));
        assert!(!reg.contains(&TenantId::new("ghost_co").unwrap()));
        assert!(reg.is_default(&TenantId::new("PUBLIC").unwrap()));
        assert!(!reg.is_default(&TenantId::new("acme_corp").unwrap()));
    }
}
