// Wishlist: a small set of listing ids persisted through a pluggable storage

use axum_extra::extract::cookie::{Cookie, CookieJar};

use crate::models::ListingId;

pub const WISHLIST_COOKIE: &str = "carWishlist";
pub const WISHLIST_MAX_AGE_DAYS: i64 = 7;

/// Where the serialized wishlist lives. Implementations hold the raw JSON text.
pub trait WishlistStorage {
    fn load(&self) -> Option<String>;
    fn save(&mut self, serialized: String);
    fn delete(&mut self);
}

/// Set of listing ids; insertion order is kept for display only.
/// Every mutation is written back to storage immediately.
pub struct WishlistStore<S: WishlistStorage> {
    storage: S,
    entries: Vec<ListingId>,
}

impl<S: WishlistStorage> WishlistStore<S> {
    /// Reads the stored set. A missing or unreadable value yields an empty wishlist.
    pub fn open(storage: S) -> Self {
        let entries = match storage.load() {
            None => Vec::new(),
            Some(raw) => match serde_json::from_str::<Vec<ListingId>>(&raw) {
                Ok(mut ids) => {
                    // Older writers could leave duplicates behind
                    let mut seen = std::collections::HashSet::new();
                    ids.retain(|id| seen.insert(id.clone()));
                    ids
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Discarding unreadable wishlist");
                    Vec::new()
                }
            },
        };
        WishlistStore { storage, entries }
    }

    pub fn entries(&self) -> &[ListingId] {
        &self.entries
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.iter().any(|entry| entry == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Adds `id` unless it is already present.
    pub fn add(&mut self, id: impl Into<ListingId>) {
        let id = id.into();
        if self.contains(&id) {
            return;
        }
        self.entries.push(id);
        self.persist();
    }

    pub fn remove(&mut self, id: &str) {
        self.entries.retain(|entry| entry != id);
        self.persist();
    }

    /// Empties the wishlist and deletes the stored value.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.storage.delete();
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    fn persist(&mut self) {
        match serde_json::to_string(&self.entries) {
            Ok(serialized) => self.storage.save(serialized),
            Err(e) => tracing::error!(error = %e, "Failed to serialize wishlist"),
        }
    }
}

// --- Storage backends ---

/// In-process storage, used by tests and non-HTTP callers.
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    value: Option<String>,
}

impl MemoryStorage {
    pub fn with_value(value: impl Into<String>) -> Self {
        MemoryStorage { value: Some(value.into()) }
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }
}

impl WishlistStorage for MemoryStorage {
    fn load(&self) -> Option<String> {
        self.value.clone()
    }

    fn save(&mut self, serialized: String) {
        self.value = Some(serialized);
    }

    fn delete(&mut self) {
        self.value = None;
    }
}

/// Cookie-backed storage over the request's cookie jar. Hand the jar back in
/// the response so the `Set-Cookie` headers are emitted.
#[derive(Debug, Default, Clone)]
pub struct CookieStorage {
    jar: CookieJar,
}

impl CookieStorage {
    pub fn new(jar: CookieJar) -> Self {
        CookieStorage { jar }
    }

    pub fn into_jar(self) -> CookieJar {
        self.jar
    }
}

impl WishlistStorage for CookieStorage {
    fn load(&self) -> Option<String> {
        self.jar.get(WISHLIST_COOKIE).map(|cookie| cookie.value().to_string())
    }

    fn save(&mut self, serialized: String) {
        let cookie = Cookie::build((WISHLIST_COOKIE, serialized))
            .path("/")
            .max_age(time::Duration::days(WISHLIST_MAX_AGE_DAYS))
            .build();
        self.jar = self.jar.clone().add(cookie);
    }

    fn delete(&mut self) {
        self.jar = self.jar.clone().remove(Cookie::build(WISHLIST_COOKIE).path("/"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> WishlistStore<MemoryStorage> {
        WishlistStore::open(MemoryStorage::default())
    }

    #[test]
    fn adding_twice_keeps_one_entry() {
        let mut wishlist = store();
        wishlist.add("car-1");
        wishlist.add("car-1");
        assert_eq!(wishlist.entries(), ["car-1"]);
    }

    #[test]
    fn add_then_remove_restores_previous_set() {
        let mut wishlist = WishlistStore::open(MemoryStorage::with_value(r#"["a","b"]"#));
        wishlist.add("c");
        wishlist.remove("c");
        assert_eq!(wishlist.entries(), ["a", "b"]);
        assert_eq!(wishlist.into_storage().value(), Some(r#"["a","b"]"#));
    }

    #[test]
    fn clear_empties_and_deletes_storage() {
        let mut wishlist = WishlistStore::open(MemoryStorage::with_value(r#"["a"]"#));
        wishlist.clear();
        assert!(wishlist.is_empty());
        assert_eq!(wishlist.into_storage().value(), None);
    }

    #[test]
    fn every_mutation_is_persisted() {
        let mut wishlist = store();
        wishlist.add("x");
        wishlist.add("y");
        let storage = wishlist.into_storage();
        assert_eq!(storage.value(), Some(r#"["x","y"]"#));

        let reopened = WishlistStore::open(storage);
        assert!(reopened.contains("y"));
        assert_eq!(reopened.len(), 2);
    }

    #[test]
    fn corrupt_value_reads_as_empty() {
        let wishlist = WishlistStore::open(MemoryStorage::with_value("{not json"));
        assert!(wishlist.is_empty());
    }

    #[test]
    fn duplicate_ids_in_storage_collapse() {
        let wishlist = WishlistStore::open(MemoryStorage::with_value(r#"["a","b","a"]"#));
        assert_eq!(wishlist.entries(), ["a", "b"]);
    }

    #[test]
    fn cookie_storage_sets_path_and_expiry() {
        let mut wishlist = WishlistStore::open(CookieStorage::new(CookieJar::new()));
        wishlist.add("car-9");
        let jar = wishlist.into_storage().into_jar();
        let cookie = jar.get(WISHLIST_COOKIE).expect("wishlist cookie");
        assert_eq!(cookie.value(), r#"["car-9"]"#);
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.max_age(), Some(time::Duration::days(7)));
    }

    #[test]
    fn cookie_storage_clear_removes_cookie() {
        let jar = CookieJar::new().add(Cookie::new(WISHLIST_COOKIE, r#"["a"]"#));
        let mut wishlist = WishlistStore::open(CookieStorage::new(jar));
        assert!(wishlist.contains("a"));
        wishlist.clear();
        let jar = wishlist.into_storage().into_jar();
        assert!(jar.get(WISHLIST_COOKIE).is_none());
    }
}
