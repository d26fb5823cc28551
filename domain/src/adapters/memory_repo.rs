use std::collections::BTreeMap;
use std::sync::Mutex;

use crate::{Code, CoreError, Link, LinkRepository};

/// Simple in-memory repository. A single mutex guards the map, which makes
/// insert-if-absent and click increments atomic.
pub struct InMemoryRepo {
    inner: Mutex<BTreeMap<String, Link>>,
}

impl InMemoryRepo {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(BTreeMap::new()),
        }
    }

    fn key(code: &Code) -> String {
        code.as_str().to_string()
    }

    /// Number of stored links.
    pub fn len(&self) -> usize {
        self.inner.lock().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryRepo {
    fn default() -> Self {
        Self::new()
    }
}

impl LinkRepository for InMemoryRepo {
    fn get(&self, code: &Code) -> Result<Option<Link>, CoreError> {
        let map = self
            .inner
            .lock()
            .map_err(|_| CoreError::Repository("mutex poisoned".into()))?;
        Ok(map.get(&Self::key(code)).cloned())
    }

    fn insert(&self, link: Link) -> Result<(), CoreError> {
        let mut map = self
            .inner
            .lock()
            .map_err(|_| CoreError::Repository("mutex poisoned".into()))?;
        let key = Self::key(&link.code);
        if map.contains_key(&key) {
            return Err(CoreError::AlreadyExists);
        }
        map.insert(key, link);
        Ok(())
    }

    fn increment_clicks(&self, code: &Code) -> Result<(), CoreError> {
        let mut map = self
            .inner
            .lock()
            .map_err(|_| CoreError::Repository("mutex poisoned".into()))?;
        if let Some(link) = map.get_mut(&Self::key(code)) {
            link.clicks = link.clicks.saturating_add(1);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::SystemTime;

    fn mk_link(code: &str) -> Link {
        Link::new(
            Code::new(code).unwrap(),
            format!("https://example.com/{code}"),
            SystemTime::UNIX_EPOCH,
        )
    }

    #[test]
    fn insert_get_roundtrip() {
        let repo = InMemoryRepo::new();
        assert!(repo.is_empty());
        repo.insert(mk_link("abc")).unwrap();
        let got = repo.get(&Code::new("abc").unwrap()).unwrap().unwrap();
        assert_eq!(got.target, "https://example.com/abc");
        assert_eq!(repo.len(), 1);
    }

    #[test]
    fn insert_rejects_duplicate() {
        let repo = InMemoryRepo::new();
        repo.insert(mk_link("dup")).unwrap();
        let err = repo.insert(mk_link("dup")).unwrap_err();
        assert!(matches!(err, CoreError::AlreadyExists));
    }

    #[test]
    fn increment_missing_is_noop() {
        let repo = InMemoryRepo::new();
        repo.increment_clicks(&Code::new("ghost").unwrap()).unwrap();
        assert!(repo.is_empty());
    }

    #[test]
    fn concurrent_increments_are_not_lost() {
        let repo = Arc::new(InMemoryRepo::new());
        repo.insert(mk_link("hot")).unwrap();
        let code = Code::new("hot").unwrap();
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let repo = Arc::clone(&repo);
                let code = code.clone();
                std::thread::spawn(move || {
                    for _ in 0..125 {
                        repo.increment_clicks(&code).unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(repo.get(&code).unwrap().unwrap().clicks, 1000);
    }
}
