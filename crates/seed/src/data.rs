//! Fixed baseline data written into every freshly migrated tenant schema.

use stockify_models::UserRole;

pub struct SeedUser {
    pub username: &'static str,
    pub password: &'static str,
    pub role: UserRole,
}

pub const SEED_USERS: [SeedUser; 3] = [
    SeedUser {
        username: "admin",
        password: "admin123",
        role: UserRole::Admin,
    },
    SeedUser {
        username: "operator",
        password: "operator123",
        role: UserRole::User,
    },
    SeedUser {
        username: "manager",
        password: "manager123",
        role: UserRole::User,
    },
];

pub struct SeedProduct {
    pub sku: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub category: &'static str,
    pub price: &'static str,
    pub stock_level: i32,
    pub low_stock_threshold: i32,
}

pub const SEED_PRODUCTS: [SeedProduct; 6] = [
    SeedProduct {
        sku: "ELEC-001",
        title: "Wireless Bluetooth Headphones",
        description: "High-quality wireless headphones with noise cancellation",
        category: "Electronics",
        price: "149.99",
        stock_level: 35,
        low_stock_threshold: 5,
    },
    SeedProduct {
        sku: "ELEC-002",
        title: "USB-C Charging Cable",
        description: "Fast charging USB-C cable with durable braided design",
        category: "Electronics",
        price: "19.99",
        stock_level: 100,
        low_stock_threshold: 10,
    },
    SeedProduct {
        sku: "HOME-001",
        title: "Ceramic Coffee Mug",
        description: "Handcrafted ceramic mug with unique design",
        category: "Home & Garden",
        price: "24.99",
        stock_level: 40,
        low_stock_threshold: 5,
    },
    SeedProduct {
        sku: "HOME-002",
        title: "LED Desk Lamp",
        description: "Adjustable LED desk lamp with touch control",
        category: "Home & Garden",
        price: "79.99",
        stock_level: 20,
        low_stock_threshold: 2,
    },
    SeedProduct {
        sku: "CLOTH-001",
        title: "Cotton T-Shirt",
        description: "Comfortable 100% cotton t-shirt in various colors",
        category: "Clothing",
        price: "19.99",
        stock_level: 75,
        low_stock_threshold: 10,
    },
    SeedProduct {
        sku: "BOOK-001",
        title: "Inventory Management Guide",
        description: "Practical guide to modern inventory management",
        category: "Books",
        price: "39.99",
        stock_level: 45,
        low_stock_threshold: 5,
    },
];

pub struct SeedConfig {
    pub key: &'static str,
    pub value: Option<&'static str>,
    pub config_type: &'static str,
    pub description: &'static str,
}

/// Default configuration rows; `value: None` means "derive per tenant"
/// (currently only the company name).
pub const SEED_CONFIG: [SeedConfig; 6] = [
    SeedConfig {
        key: "company_name",
        value: None,
        config_type: "STRING",
        description: "Display name for the tenant",
    },
    SeedConfig {
        key: "currency",
        value: Some("USD"),
        config_type: "STRING",
        description: "Default currency for pricing",
    },
    SeedConfig {
        key: "locale",
        value: Some("en-US"),
        config_type: "STRING",
        description: "Default locale for the tenant",
    },
    SeedConfig {
        key: "low_stock_threshold",
        value: Some("5"),
        config_type: "INTEGER",
        description: "Default threshold for low stock alerts",
    },
    SeedConfig {
        key: "notifications_enabled",
        value: Some("true"),
        config_type: "BOOLEAN",
        description: "Enable notifications for low stock",
    },
    SeedConfig {
        key: "tenant_status",
        value: Some("ACTIVE"),
        config_type: "STRING",
        description: "Tenant lifecycle status",
    },
];

/// Title-cased company name derived from the schema name:
/// `acme_corp` becomes `Acme Corp`.
pub fn derived_company_name(schema: &str) -> String {
    schema
        .split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn company_name_derivation() {
        assert_eq!(derived_company_name("acme_corp"), "Acme Corp");
        assert_eq!(derived_company_name("public"), "Public");
        assert_eq!(derived_company_name("tech_solutions"), "Tech Solutions");
    }
}
