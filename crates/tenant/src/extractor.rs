use crate::error::TenantIdError;
use crate::id::TenantId;

/// Primary extraction: explicit header first, then the authentication-form
/// field (the caller only passes `form_tenant` on the login-submission path).
///
/// An asserted identifier that fails validation is an error, never treated
/// as absent: a request claiming a tenant must not be silently downgraded
/// to the default tenant's data.
pub fn extract_from_header_or_form(
    header: Option<&str>,
    form_tenant: Option<&str>,
) -> Result<Option<TenantId>, TenantIdError> {
    let asserted = header
        .filter(|v| !v.trim().is_empty())
        .or(form_tenant.filter(|v| !v.trim().is_empty()));
    match asserted {
        Some(raw) => TenantId::new(raw).map(Some),
        None => Ok(None),
    }
}

/// Request pieces the fallback chain inspects when no header is present.
#[derive(Debug, Default)]
pub struct FallbackParts<'a> {
    pub host: Option<&'a str>,
    pub path: &'a str,
    pub query: Option<&'a str>,
}

/// Secondary extraction, in priority order: subdomain, `/tenant/{id}/...`
/// path segment, `tenantId` query parameter.
pub fn extract_from_fallbacks(parts: &FallbackParts<'_>) -> Option<TenantId> {
    from_subdomain(parts.host)
        .or_else(|| from_path(parts.path))
        .or_else(|| parts.query.and_then(from_query))
}

fn from_subdomain(host: Option<&str>) -> Option<TenantId> {
    let host = host?;
    // Strip any port before splitting on dots.
    let host = host.split(':').next().unwrap_or(host);
    let segments: Vec<&str> = host.split('.').collect();
    // tenant.example.com, not example.com or a bare hostname.
    if segments.len() <= 2 {
        return None;
    }
    let candidate = segments[0];
    if candidate.eq_ignore_ascii_case("www") || candidate.eq_ignore_ascii_case("api") {
        return None;
    }
    TenantId::new(candidate).ok()
}

fn from_path(path: &str) -> Option<TenantId> {
    let rest = path.strip_prefix("/tenant/")?;
    let segment = rest.split('/').next()?;
    if segment.is_empty() {
        return None;
    }
    TenantId::new(segment).ok()
}

fn from_query(query: &str) -> Option<TenantId> {
    let pairs: Vec<(String, String)> = serde_urlencoded::from_str(query).ok()?;
    pairs
        .iter()
        .find(|(k, v)| k == "tenantId" && !v.trim().is_empty())
        .and_then(|(_, v)| TenantId::new(v).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_wins_over_form() {
        let id = extract_from_header_or_form(Some("ACME"), Some("other"))
            .unwrap()
            .unwrap();
        assert_eq!(id.as_str(), "acme");
    }

    #[test]
    fn form_used_when_header_absent_or_blank() {
        let id = extract_from_header_or_form(None, Some("Acme-Corp"))
            .unwrap()
            .unwrap();
        assert_eq!(id.as_str(), "acme_corp");
        let id = extract_from_header_or_form(Some("  "), Some("acme"))
            .unwrap()
            .unwrap();
        assert_eq!(id.as_str(), "acme");
    }

    #[test]
    fn nothing_extracted_when_both_absent() {
        assert!(extract_from_header_or_form(None, None).unwrap().is_none());
    }

    #[test]
    fn malformed_asserted_identifier_is_an_error_not_absent() {
        let err = extract_from_header_or_form(Some("ghost co!"), None).unwrap_err();
        assert!(matches!(err, TenantIdError::InvalidCharacters(_)));
        // Same contract on the form path.
        assert!(extract_from_header_or_form(None, Some("a.b")).is_err());
    }

    #[test]
    fn subdomain_extraction() {
        let parts = FallbackParts {
            host: Some("acme.stockify.example"),
            path: "/",
            query: None,
        };
        assert_eq!(extract_from_fallbacks(&parts).unwrap().as_str(), "acme");
    }

    #[test]
    fn www_and_api_subdomains_are_ignored() {
        for host in ["www.stockify.example", "api.stockify.example"] {
            let parts = FallbackParts {
                host: Some(host),
                path: "/",
                query: None,
            };
            assert!(extract_from_fallbacks(&parts).is_none());
        }
    }

    #[test]
    fn bare_domain_has_no_subdomain() {
        let parts = FallbackParts {
            host: Some("stockify.example:8080"),
            path: "/",
            query: None,
        };
        assert!(extract_from_fallbacks(&parts).is_none());
    }

    #[test]
    fn path_segment_extraction() {
        let parts = FallbackParts {
            host: None,
            path: "/tenant/Global-Trade/products",
            query: None,
        };
        assert_eq!(
            extract_from_fallbacks(&parts).unwrap().as_str(),
            "global_trade"
        );
    }

    #[test]
    fn query_parameter_extraction() {
        let parts = FallbackParts {
            host: None,
            path: "/products",
            query: Some("page=2&tenantId=Tech-Solutions"),
        };
        assert_eq!(
            extract_from_fallbacks(&parts).unwrap().as_str(),
            "tech_solutions"
        );
    }

    #[test]
    fn subdomain_takes_priority_over_path_and_query() {
        let parts = FallbackParts {
            host: Some("acme.stockify.example"),
            path: "/tenant/other/products",
            query: Some("tenantId=third"),
        };
        assert_eq!(extract_from_fallbacks(&parts).unwrap().as_str(), "acme");
    }
}
