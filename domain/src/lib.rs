//! Domain library for the link-stepping redirector.
//!
//! Holds the domain types, ports (traits), and error definitions. Keep
//! adapters and IO concerns out of this crate; the only external crates here
//! are `rand` for code generation, `url` for target validation and `tracing`.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::SystemTime;

/// Short code identifying a stored link.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Code(String);

impl Code {
    pub fn new<S: Into<String>>(s: S) -> Result<Self, CoreError> {
        let val = s.into();
        if val.is_empty() {
            return Err(CoreError::InvalidCode("empty".into()));
        }
        if !val.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(CoreError::InvalidCode("invalid characters".into()));
        }
        Ok(Self(val))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Code {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Stored link: the only persisted entity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Link {
    pub code: Code,
    /// Absolute http(s) URL, validated before the link is created.
    pub target: String,
    pub created_at: SystemTime,
    /// Reserved; nothing sets it yet.
    pub title: Option<String>,
    /// Number of visitors that reached the final redirect.
    pub clicks: u64,
}

impl Link {
    /// Create a fresh link with no title and a zero click count.
    pub fn new(code: Code, target: String, created_at: SystemTime) -> Self {
        Self {
            code,
            target,
            created_at,
            title: None,
            clicks: 0,
        }
    }
}

/// Time source abstraction to make code testable.
pub trait Clock: Send + Sync {
    fn now(&self) -> SystemTime;
}

/// Wall-clock implementation of [`Clock`].
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// Source of candidate short codes. Candidates are not guaranteed unique;
/// the service checks them against the repository.
pub trait CodeGenerator: Send + Sync {
    fn next_code(&self) -> Code;
}

/// Repository port for persisting and loading links.
pub trait LinkRepository: Send + Sync {
    fn get(&self, code: &Code) -> Result<Option<Link>, CoreError>;
    /// Insert a new link. Fails with `AlreadyExists` if the code is taken.
    fn insert(&self, link: Link) -> Result<(), CoreError>;
    /// Atomically increment the click count. Absent codes are a no-op.
    fn increment_clicks(&self, code: &Code) -> Result<(), CoreError>;
}

impl<T: LinkRepository + ?Sized> LinkRepository for std::sync::Arc<T> {
    fn get(&self, code: &Code) -> Result<Option<Link>, CoreError> {
        (**self).get(code)
    }

    fn insert(&self, link: Link) -> Result<(), CoreError> {
        (**self).insert(link)
    }

    fn increment_clicks(&self, code: &Code) -> Result<(), CoreError> {
        (**self).increment_clicks(code)
    }
}

/// Core domain errors.
#[derive(Debug)]
pub enum CoreError {
    InvalidUrl(String),
    InvalidCode(String),
    AlreadyExists,
    NotFound,
    Repository(String),
}

impl Display for CoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CoreError::InvalidUrl(msg) => write!(f, "invalid url: {}", msg),
            CoreError::InvalidCode(msg) => write!(f, "invalid code: {}", msg),
            CoreError::AlreadyExists => write!(f, "code already exists"),
            CoreError::NotFound => write!(f, "not found"),
            CoreError::Repository(msg) => write!(f, "repository error: {}", msg),
        }
    }
}

impl Error for CoreError {}

pub mod adapters;
pub mod base62;
pub mod code;
pub mod sequence;
pub mod service;
pub mod validate;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_new_accepts_alphanumeric() {
        let c = Code::new("aZ09xy").expect("valid code");
        assert_eq!(c.as_str(), "aZ09xy");
        assert_eq!(c.to_string(), "aZ09xy");
    }

    #[test]
    fn code_rejects_empty_and_symbols() {
        assert!(matches!(Code::new(""), Err(CoreError::InvalidCode(_))));
        assert!(matches!(Code::new("ab-cd"), Err(CoreError::InvalidCode(_))));
        assert!(matches!(Code::new("ab/cd"), Err(CoreError::InvalidCode(_))));
        assert!(matches!(Code::new("café"), Err(CoreError::InvalidCode(_))));
    }

    #[test]
    fn new_link_starts_without_clicks() {
        let link = Link::new(
            Code::new("abc123").unwrap(),
            "https://example.com".into(),
            SystemTime::UNIX_EPOCH,
        );
        assert_eq!(link.clicks, 0);
        assert!(link.title.is_none());
    }
}
