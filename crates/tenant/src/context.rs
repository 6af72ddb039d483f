use crate::error::ContextError;
use crate::id::TenantId;
use std::sync::{Arc, Mutex};

/// Per-unit-of-work store of the current tenant identifier.
///
/// One context is created per unit of work (a request, a seeding pass for one
/// tenant) and carried explicitly, in axum request extensions or cloned
/// onto a spawned task. There is no thread-local or process-global fallback:
/// a fresh context is always unbound, regardless of what ran on the worker
/// before.
///
/// Cloning is cheap and shares the binding; cross-task propagation is
/// explicit via `clone()`, never automatic.
#[derive(Debug, Clone, Default)]
pub struct TenantContext {
    current: Arc<Mutex<Option<TenantId>>>,
}

impl TenantContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds a tenant to this unit of work. Rebinding an already-bound
    /// context is an error; deliberate identity changes go through
    /// [`TenantContext::switch`].
    pub fn bind(&self, id: TenantId) -> Result<(), ContextError> {
        let mut current = self.current.lock().unwrap();
        if let Some(existing) = current.as_ref() {
            return Err(ContextError::AlreadyBound {
                current: existing.to_string(),
                attempted: id.to_string(),
            });
        }
        tracing::debug!(tenant = %id, "Bound tenant context");
        *current = Some(id);
        Ok(())
    }

    /// Explicit rebind for privileged tenant switches. Returns the previous
    /// binding, if any, and logs the transition.
    pub fn switch(&self, id: TenantId) -> Option<TenantId> {
        let mut current = self.current.lock().unwrap();
        let previous = current.replace(id);
        match (&previous, current.as_ref()) {
            (Some(prev), Some(next)) => {
                tracing::info!(from = %prev, to = %next, "Switched tenant context")
            }
            (None, Some(next)) => tracing::debug!(tenant = %next, "Bound tenant context"),
            _ => unreachable!(),
        }
        previous
    }

    pub fn current(&self) -> Option<TenantId> {
        self.current.lock().unwrap().clone()
    }

    /// Idempotent: clearing an unbound context is a no-op.
    pub fn clear(&self) {
        let mut current = self.current.lock().unwrap();
        if let Some(id) = current.take() {
            tracing::debug!(tenant = %id, "Cleared tenant context");
        }
    }

    pub fn is_bound(&self) -> bool {
        self.current.lock().unwrap().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tid(s: &str) -> TenantId {
        TenantId::new(s).unwrap()
    }

    #[test]
    fn fresh_context_is_unbound() {
        let ctx = TenantContext::new();
        assert_eq!(ctx.current(), None);
        assert!(!ctx.is_bound());
    }

    #[test]
    fn bind_then_clear_round_trip() {
        let ctx = TenantContext::new();
        ctx.bind(tid("acme_corp")).unwrap();
        assert_eq!(ctx.current(), Some(tid("acme_corp")));
        ctx.clear();
        assert_eq!(ctx.current(), None);
    }

    #[test]
    fn rebind_is_an_error() {
        let ctx = TenantContext::new();
        ctx.bind(tid("acme_corp")).unwrap();
        let err = ctx.bind(tid("public")).unwrap_err();
        assert_eq!(
            err,
            ContextError::AlreadyBound {
                current: "acme_corp".into(),
                attempted: "public".into(),
            }
        );
        // Failed rebind leaves the original binding intact.
        assert_eq!(ctx.current(), Some(tid("acme_corp")));
    }

    #[test]
    fn switch_returns_previous_binding() {
        let ctx = TenantContext::new();
        assert_eq!(ctx.switch(tid("public")), None);
        assert_eq!(ctx.switch(tid("acme_corp")), Some(tid("public")));
        assert_eq!(ctx.current(), Some(tid("acme_corp")));
    }

    #[test]
    fn clear_is_idempotent() {
        let ctx = TenantContext::new();
        ctx.clear();
        ctx.bind(tid("public")).unwrap();
        ctx.clear();
        ctx.clear();
        assert_eq!(ctx.current(), None);
    }

    #[test]
    fn clones_share_the_binding() {
        let ctx = TenantContext::new();
        let other = ctx.clone();
        ctx.bind(tid("acme_corp")).unwrap();
        assert_eq!(other.current(), Some(tid("acme_corp")));
        other.clear();
        assert_eq!(ctx.current(), None);
    }
}
