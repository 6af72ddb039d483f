use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TenantIdError {
    #[error("Tenant identifier is empty")]
    Empty,

    #[error("Tenant identifier contains invalid characters: {0}")]
    InvalidCharacters(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContextError {
    #[error("Tenant context already bound to '{current}' (attempted rebind to '{attempted}')")]
    AlreadyBound { current: String, attempted: String },
}
