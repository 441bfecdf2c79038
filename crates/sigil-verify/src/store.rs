//! The injected credential persistence boundary.
//!
//! Durable storage is the embedding platform's concern; this trait is the
//! swap point. `StoreError` models infrastructure failure, the only error
//! class the verifier propagates instead of mapping to a reason code.

use dashmap::DashMap;

use sigil_core::Credential;

use crate::error::StoreError;

/// Credential persistence as seen by the anchoring and verification layers.
pub trait CredentialStore: Send + Sync {
    fn get(&self, id: &str) -> Result<Option<Credential>, StoreError>;

    /// Insert or replace a credential under its id.
    fn put(&self, credential: Credential) -> Result<(), StoreError>;

    fn list(&self) -> Result<Vec<Credential>, StoreError>;

    fn count(&self) -> Result<usize, StoreError>;
}

/// In-memory [`CredentialStore`] backed by a `DashMap`.
#[derive(Default)]
pub struct InMemoryCredentialStore {
    credentials: DashMap<String, Credential>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for InMemoryCredentialStore {
    fn get(&self, id: &str) -> Result<Option<Credential>, StoreError> {
        Ok(self.credentials.get(id).map(|c| c.clone()))
    }

    fn put(&self, credential: Credential) -> Result<(), StoreError> {
        self.credentials.insert(credential.id.clone(), credential);
        Ok(())
    }

    fn list(&self) -> Result<Vec<Credential>, StoreError> {
        Ok(self.credentials.iter().map(|c| c.clone()).collect())
    }

    fn count(&self) -> Result<usize, StoreError> {
        Ok(self.credentials.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sigil_core::CredentialKind;

    fn sample(id: &str) -> Credential {
        Credential::new(
            id,
            "u1",
            "AWS",
            "Cert",
            CredentialKind::Certification,
            "2024-01-01",
            None,
            vec!["py".into()],
        )
        .unwrap()
    }

    #[test]
    fn test_get_missing_is_none() {
        let store = InMemoryCredentialStore::new();
        assert!(store.get("missing").unwrap().is_none());
    }

    #[test]
    fn test_put_and_get() {
        let store = InMemoryCredentialStore::new();
        store.put(sample("c1")).unwrap();

        let found = store.get("c1").unwrap().unwrap();
        assert_eq!(found.id, "c1");
        assert_eq!(found.issuer, "AWS");
    }

    #[test]
    fn test_put_replaces() {
        let store = InMemoryCredentialStore::new();
        store.put(sample("c1")).unwrap();
        let mut updated = sample("c1");
        updated.title = "Cert II".into();
        store.put(updated).unwrap();

        assert_eq!(store.count().unwrap(), 1);
        assert_eq!(store.get("c1").unwrap().unwrap().title, "Cert II");
    }

    #[test]
    fn test_list_and_count() {
        let store = InMemoryCredentialStore::new();
        store.put(sample("c1")).unwrap();
        store.put(sample("c2")).unwrap();

        assert_eq!(store.count().unwrap(), 2);
        let mut ids: Vec<String> = store.list().unwrap().into_iter().map(|c| c.id).collect();
        ids.sort();
        assert_eq!(ids, vec!["c1", "c2"]);
    }
}
