use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    SuperAdmin,
    Admin,
    User,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::SuperAdmin => "SUPER_ADMIN",
            UserRole::Admin => "ADMIN",
            UserRole::User => "USER",
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// Roles live in a TEXT column, same shape in every tenant schema.
impl sqlx::Type<sqlx::Postgres> for UserRole {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        sqlx::postgres::PgTypeInfo::with_name("TEXT")
    }
}

impl<'r> sqlx::Decode<'r, sqlx::Postgres> for UserRole {
    fn decode(
        value: sqlx::postgres::PgValueRef<'r>,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        match s.as_str() {
            "SUPER_ADMIN" => Ok(UserRole::SuperAdmin),
            "ADMIN" => Ok(UserRole::Admin),
            "USER" => Ok(UserRole::User),
            other => Err(format!("Unknown user role: {}", other).into()),
        }
    }
}

impl<'q> sqlx::Encode<'q, sqlx::Postgres> for UserRole {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, Box<dyn std::error::Error + Send + Sync>> {
        <&str as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.as_str(), buf)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AppUser {
    pub id: i64,
    pub username: String,

    #[serde(skip_serializing)]
    pub password_hash: String,

    pub role: UserRole,
    pub is_active: bool,

    // Cross-tenant access (superadmin only)
    pub can_manage_all_tenants: bool,
    pub is_global_user: bool,
    pub accessible_tenants: Option<String>,
    pub primary_tenant: Option<String>,

    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AppUser {
    /// Tenants listed on the account, parsed from the comma-separated column.
    pub fn accessible_tenant_list(&self) -> Vec<String> {
        self.accessible_tenants
            .as_deref()
            .map(|raw| {
                raw.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(accessible: Option<&str>) -> AppUser {
        AppUser {
            id: 1,
            username: "superadmin".into(),
            password_hash: String::new(),
            role: UserRole::SuperAdmin,
            is_active: true,
            can_manage_all_tenants: true,
            is_global_user: true,
            accessible_tenants: accessible.map(String::from),
            primary_tenant: Some("stockify".into()),
            last_login: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn parses_accessible_tenant_list() {
        let u = user(Some("public, acme_corp,stockify"));
        assert_eq!(
            u.accessible_tenant_list(),
            vec!["public", "acme_corp", "stockify"]
        );
    }

    #[test]
    fn empty_access_list_when_column_is_null() {
        assert!(user(None).accessible_tenant_list().is_empty());
    }

    #[test]
    fn role_names_round_trip() {
        assert_eq!(UserRole::SuperAdmin.as_str(), "SUPER_ADMIN");
        assert_eq!(UserRole::Admin.to_string(), "ADMIN");
    }
}
