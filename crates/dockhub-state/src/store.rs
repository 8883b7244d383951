//! MetadataStore: JSON-file persistence for curated service metadata.
//!
//! Reads never fail: a missing or unparseable file loads as
//! [`StoreDocument::default_shape`]. Writes are serialized behind one
//! in-process lock, checked against the content version observed at load
//! time, and land atomically via a temp file renamed over the target.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use dockhub_core::aggregate::display_order;
use dockhub_core::{CategoryDescriptor, ServiceDescriptor, StoreDocument};

use crate::error::{StateError, StateResult};

/// Content version of the stored bytes. `None` means no file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Version(Option<String>);

impl Version {
    fn of(bytes: Option<&[u8]>) -> Self {
        Self(bytes.map(|b| hex::encode(Sha256::digest(b))))
    }

    pub fn as_str(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

/// A loaded document plus the version it was read at.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub document: StoreDocument,
    pub version: Version,
}

/// Direction for [`MetadataStore::move_category`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Move {
    Up,
    Down,
}

enum Backend {
    File(PathBuf),
    Memory(Mutex<Option<Vec<u8>>>),
}

impl Backend {
    fn read(&self) -> StateResult<Option<Vec<u8>>> {
        match self {
            Backend::File(path) => match std::fs::read(path) {
                Ok(bytes) => Ok(Some(bytes)),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
                Err(e) => Err(StateError::Read(format!("{}: {e}", path.display()))),
            },
            Backend::Memory(cell) => Ok(lock(cell).clone()),
        }
    }

    fn write(&self, bytes: &[u8]) -> StateResult<()> {
        match self {
            Backend::File(path) => write_atomic(path, bytes),
            Backend::Memory(cell) => {
                *lock(cell) = Some(bytes.to_vec());
                Ok(())
            }
        }
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn write_atomic(path: &Path, bytes: &[u8]) -> StateResult<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .map_err(|e| StateError::Write(format!("{}: {e}", dir.display())))?;
    tmp.write_all(bytes)
        .and_then(|_| tmp.as_file().sync_all())
        .map_err(|e| StateError::Write(e.to_string()))?;
    tmp.persist(path)
        .map_err(|e| StateError::Write(format!("{}: {}", path.display(), e.error)))?;
    Ok(())
}

/// Thread-safe handle to the metadata store. Cheap to clone.
#[derive(Clone)]
pub struct MetadataStore {
    backend: Arc<Backend>,
    write_lock: Arc<Mutex<()>>,
}

impl MetadataStore {
    /// Use the JSON file at `path`. The file is created on first write.
    pub fn open(path: &Path) -> Self {
        debug!(?path, "metadata store opened");
        Self::with_backend(Backend::File(path.to_path_buf()))
    }

    /// Create an ephemeral in-memory store (for testing).
    pub fn open_in_memory() -> Self {
        Self::with_backend(Backend::Memory(Mutex::new(None)))
    }

    fn with_backend(backend: Backend) -> Self {
        Self {
            backend: Arc::new(backend),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    // ── Load / save ────────────────────────────────────────────────

    /// Read the current document. Never fails.
    pub fn load(&self) -> Snapshot {
        let bytes = match self.backend.read() {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(error = %e, "metadata store unreadable, using defaults");
                return Snapshot {
                    document: StoreDocument::default_shape(),
                    version: Version::default(),
                };
            }
        };
        let version = Version::of(bytes.as_deref());
        let document = match bytes {
            None => {
                debug!("metadata store absent, using defaults");
                StoreDocument::default_shape()
            }
            Some(bytes) => match serde_json::from_slice(&bytes) {
                Ok(doc) => doc,
                Err(e) => {
                    warn!(error = %e, "metadata store unparseable, using defaults");
                    StoreDocument::default_shape()
                }
            },
        };
        Snapshot { document, version }
    }

    /// Write `document` if the stored version still equals `expected`.
    pub fn save(&self, document: &StoreDocument, expected: &Version) -> StateResult<Version> {
        let _guard = lock(&self.write_lock);
        self.save_locked(document, expected)
    }

    fn save_locked(&self, document: &StoreDocument, expected: &Version) -> StateResult<Version> {
        let current = Version::of(self.backend.read()?.as_deref());
        if &current != expected {
            warn!(?expected, ?current, "metadata store version conflict");
            return Err(StateError::Conflict);
        }
        let mut bytes =
            serde_json::to_vec_pretty(document).map_err(|e| StateError::Serialize(e.to_string()))?;
        bytes.push(b'\n');
        self.backend.write(&bytes)?;
        Ok(Version::of(Some(&bytes)))
    }

    /// One load, one mutation, one save, all under the write lock.
    fn mutate<T>(&self, f: impl FnOnce(&mut StoreDocument) -> StateResult<T>) -> StateResult<T> {
        let _guard = lock(&self.write_lock);
        let Snapshot {
            mut document,
            version,
        } = self.load();
        let out = f(&mut document)?;
        self.save_locked(&document, &version)?;
        Ok(out)
    }

    // ── Services ───────────────────────────────────────────────────

    pub fn services(&self) -> std::collections::BTreeMap<String, ServiceDescriptor> {
        self.load().document.services
    }

    /// Create or replace the entry keyed by the descriptor's own name.
    pub fn put_service(&self, mut descriptor: ServiceDescriptor) -> StateResult<ServiceDescriptor> {
        if descriptor.name.trim().is_empty() {
            return Err(StateError::MissingName("service"));
        }
        descriptor.uncategorized = false;
        let key = descriptor.name.clone();
        self.mutate(|doc| {
            doc.services.insert(key.clone(), descriptor.clone());
            Ok(())
        })?;
        info!(service = %key, "service stored");
        Ok(descriptor)
    }

    /// Replace an existing entry under `key`.
    pub fn replace_service(
        &self,
        key: &str,
        mut descriptor: ServiceDescriptor,
    ) -> StateResult<ServiceDescriptor> {
        descriptor.uncategorized = false;
        self.mutate(|doc| match doc.services.get_mut(key) {
            Some(slot) => {
                *slot = descriptor.clone();
                Ok(())
            }
            None => Err(not_found("service", key)),
        })?;
        info!(service = %key, "service updated");
        Ok(descriptor)
    }

    /// Overwrite the displayed fields of an existing entry, keeping any
    /// other fields it carries.
    pub fn edit_service(
        &self,
        key: &str,
        edit: ServiceDescriptor,
    ) -> StateResult<ServiceDescriptor> {
        let stored = self.mutate(|doc| match doc.services.get_mut(key) {
            Some(slot) => {
                slot.name = edit.name;
                slot.description = edit.description;
                slot.icon = edit.icon;
                slot.category = edit.category;
                slot.uncategorized = false;
                Ok(slot.clone())
            }
            None => Err(not_found("service", key)),
        })?;
        info!(service = %key, "service edited");
        Ok(stored)
    }

    pub fn delete_service(&self, key: &str) -> StateResult<()> {
        self.mutate(|doc| match doc.services.remove(key) {
            Some(_) => Ok(()),
            None => Err(not_found("service", key)),
        })?;
        info!(service = %key, "service deleted");
        Ok(())
    }

    // ── Categories ─────────────────────────────────────────────────

    pub fn categories(&self) -> std::collections::BTreeMap<String, CategoryDescriptor> {
        self.load().document.categories
    }

    /// Create or replace the category keyed by the descriptor's own name.
    pub fn put_category(&self, descriptor: CategoryDescriptor) -> StateResult<CategoryDescriptor> {
        if descriptor.name.trim().is_empty() {
            return Err(StateError::MissingName("category"));
        }
        let key = descriptor.name.clone();
        self.mutate(|doc| {
            doc.categories.insert(key.clone(), descriptor.clone());
            Ok(())
        })?;
        info!(category = %key, "category stored");
        Ok(descriptor)
    }

    pub fn replace_category(
        &self,
        key: &str,
        descriptor: CategoryDescriptor,
    ) -> StateResult<CategoryDescriptor> {
        self.mutate(|doc| match doc.categories.get_mut(key) {
            Some(slot) => {
                *slot = descriptor.clone();
                Ok(())
            }
            None => Err(not_found("category", key)),
        })?;
        info!(category = %key, "category updated");
        Ok(descriptor)
    }

    /// Overwrite the name and icon of an existing category, keeping any
    /// other fields it carries.
    pub fn edit_category(
        &self,
        key: &str,
        edit: CategoryDescriptor,
    ) -> StateResult<CategoryDescriptor> {
        let stored = self.mutate(|doc| match doc.categories.get_mut(key) {
            Some(slot) => {
                slot.name = edit.name;
                slot.icon = edit.icon;
                Ok(slot.clone())
            }
            None => Err(not_found("category", key)),
        })?;
        info!(category = %key, "category edited");
        Ok(stored)
    }

    /// Delete a category and drop it from the persisted order.
    pub fn delete_category(&self, key: &str) -> StateResult<()> {
        self.mutate(|doc| {
            if doc.categories.remove(key).is_none() {
                return Err(not_found("category", key));
            }
            doc.category_order.retain(|c| c != key);
            Ok(())
        })?;
        info!(category = %key, "category deleted");
        Ok(())
    }

    // ── Category order ─────────────────────────────────────────────

    /// Store `order` as given. Unknown names are kept; they are inert.
    pub fn set_category_order(&self, order: Vec<String>) -> StateResult<Vec<String>> {
        self.mutate(|doc| {
            doc.category_order = order.clone();
            Ok(())
        })?;
        info!(entries = order.len(), "category order stored");
        Ok(order)
    }

    /// Known categories, persisted order first, then the rest by name.
    pub fn ordered_categories(&self) -> Vec<String> {
        known_order(&self.load().document)
    }

    /// Swap a category with its neighbour and persist the full order.
    pub fn move_category(&self, key: &str, direction: Move) -> StateResult<Vec<String>> {
        let order = self.mutate(|doc| {
            let mut order = known_order(doc);
            let idx = order
                .iter()
                .position(|c| c == key)
                .ok_or_else(|| not_found("category", key))?;
            let target = match direction {
                Move::Up => idx.checked_sub(1),
                Move::Down => (idx + 1 < order.len()).then_some(idx + 1),
            };
            if let Some(target) = target {
                order.swap(idx, target);
            }
            doc.category_order = order.clone();
            Ok(order)
        })?;
        info!(category = %key, ?direction, "category moved");
        Ok(order)
    }
}

/// Known categories of `doc`, persisted order first, then the rest by name.
pub fn known_order(doc: &StoreDocument) -> Vec<String> {
    let known: Vec<&str> = doc.categories.keys().map(String::as_str).collect();
    display_order(&doc.category_order, &known)
}

fn not_found(kind: &'static str, name: &str) -> StateError {
    StateError::NotFound {
        kind,
        name: name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(name: &str, category: &str) -> ServiceDescriptor {
        ServiceDescriptor {
            name: name.to_string(),
            description: format!("{name} service"),
            icon: "📦".to_string(),
            category: category.to_string(),
            ..Default::default()
        }
    }

    // ── Defaults ───────────────────────────────────────────────────

    #[test]
    fn missing_store_loads_default_shape() {
        let store = MetadataStore::open_in_memory();
        let snap = store.load();
        assert_eq!(snap.document, StoreDocument::default_shape());
        assert_eq!(snap.version, Version::default());
    }

    #[test]
    fn corrupt_file_loads_default_shape() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("services.json");
        std::fs::write(&path, "{ not json").unwrap();

        let store = MetadataStore::open(&path);
        let snap = store.load();
        assert_eq!(snap.document, StoreDocument::default_shape());
        assert!(snap.version.as_str().is_some());
    }

    // ── Services CRUD ──────────────────────────────────────────────

    #[test]
    fn service_put_and_list() {
        let store = MetadataStore::open_in_memory();
        store.put_service(service("grafana", "Monitoring")).unwrap();
        let services = store.services();
        assert_eq!(services.len(), 1);
        assert_eq!(services["grafana"].category, "Monitoring");
    }

    #[test]
    fn service_without_name_rejected() {
        let store = MetadataStore::open_in_memory();
        let err = store.put_service(service("", "Dev")).unwrap_err();
        assert!(matches!(err, StateError::MissingName("service")));
        assert!(store.services().is_empty());
        assert_eq!(store.load().version, Version::default());
    }

    #[test]
    fn uncategorized_flag_never_stored() {
        let store = MetadataStore::open_in_memory();
        let mut desc = service("web", "Dev");
        desc.uncategorized = true;
        store.put_service(desc).unwrap();
        assert!(!store.services()["web"].uncategorized);
    }

    #[test]
    fn replace_missing_service_is_not_found() {
        let store = MetadataStore::open_in_memory();
        let err = store.replace_service("ghost", service("ghost", "Dev")).unwrap_err();
        assert!(matches!(err, StateError::NotFound { kind: "service", .. }));
    }

    #[test]
    fn replace_keeps_url_key() {
        let store = MetadataStore::open_in_memory();
        store.put_service(service("web", "Dev")).unwrap();
        store.replace_service("web", service("Website", "Media")).unwrap();
        let services = store.services();
        assert_eq!(services.len(), 1);
        assert_eq!(services["web"].name, "Website");
    }

    #[test]
    fn edit_keeps_extra_fields() {
        let store = MetadataStore::open_in_memory();
        let mut desc = service("web", "Dev");
        desc.extra.insert("healthcheck".into(), serde_json::json!("/ping"));
        store.put_service(desc).unwrap();

        store.edit_service("web", service("Website", "Media")).unwrap();
        let stored = &store.services()["web"];
        assert_eq!(stored.name, "Website");
        assert_eq!(stored.category, "Media");
        assert_eq!(stored.extra["healthcheck"], "/ping");

        let mut cat = CategoryDescriptor::new("Media", "🎬");
        cat.extra.insert("color".into(), serde_json::json!("red"));
        store.put_category(cat).unwrap();
        store
            .edit_category("Media", CategoryDescriptor::new("Movies", "🎞"))
            .unwrap();
        let stored = &store.categories()["Media"];
        assert_eq!(stored.name, "Movies");
        assert_eq!(stored.extra["color"], "red");

        let err = store.edit_service("ghost", service("ghost", "Dev")).unwrap_err();
        assert!(matches!(err, StateError::NotFound { kind: "service", .. }));
    }

    #[test]
    fn delete_service() {
        let store = MetadataStore::open_in_memory();
        store.put_service(service("web", "Dev")).unwrap();
        store.delete_service("web").unwrap();
        assert!(store.services().is_empty());
        assert!(store.delete_service("web").is_err());
    }

    // ── Categories CRUD ────────────────────────────────────────────

    #[test]
    fn delete_category_prunes_order() {
        let store = MetadataStore::open_in_memory();
        store.put_category(CategoryDescriptor::new("Media", "🎬")).unwrap();
        store
            .set_category_order(vec!["Media".into(), "Other".into(), "Ghost".into()])
            .unwrap();

        store.delete_category("Media").unwrap();
        let doc = store.load().document;
        assert!(!doc.categories.contains_key("Media"));
        assert_eq!(doc.category_order, vec!["Other", "Ghost"]);
    }

    #[test]
    fn delete_missing_category_leaves_store_unchanged() {
        let store = MetadataStore::open_in_memory();
        store.set_category_order(vec!["Other".into()]).unwrap();
        let before = store.load();

        let err = store.delete_category("Nope").unwrap_err();
        assert!(matches!(err, StateError::NotFound { kind: "category", .. }));

        let after = store.load();
        assert_eq!(before.version, after.version);
        assert_eq!(before.document, after.document);
    }

    #[test]
    fn category_without_name_rejected() {
        let store = MetadataStore::open_in_memory();
        let err = store.put_category(CategoryDescriptor::new(" ", "x")).unwrap_err();
        assert!(err.is_client_error());
    }

    // ── Order ──────────────────────────────────────────────────────

    #[test]
    fn order_accepts_unknown_names() {
        let store = MetadataStore::open_in_memory();
        store.set_category_order(vec!["Ghost".into(), "Other".into()]).unwrap();
        assert_eq!(store.load().document.category_order, vec!["Ghost", "Other"]);
        assert_eq!(store.ordered_categories(), vec!["Other"]);
    }

    #[test]
    fn move_category_rewrites_full_order() {
        let store = MetadataStore::open_in_memory();
        store.put_category(CategoryDescriptor::new("Dev", "🛠")).unwrap();
        store.put_category(CategoryDescriptor::new("Media", "🎬")).unwrap();
        store.set_category_order(vec!["Media".into(), "Ghost".into()]).unwrap();

        assert_eq!(store.ordered_categories(), vec!["Media", "Dev", "Other"]);
        let order = store.move_category("Other", Move::Up).unwrap();
        assert_eq!(order, vec!["Media", "Other", "Dev"]);
        let order = store.move_category("Media", Move::Up).unwrap();
        assert_eq!(order, vec!["Media", "Other", "Dev"]);
        assert!(store.move_category("Ghost", Move::Down).is_err());
    }

    // ── Persistence ────────────────────────────────────────────────

    #[test]
    fn persistence_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("services.json");
        {
            let store = MetadataStore::open(&path);
            store.put_service(service("jellyfin", "Media")).unwrap();
        }
        let store = MetadataStore::open(&path);
        assert_eq!(store.services()["jellyfin"].category, "Media");

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\n  \"categories\""));
        assert!(raw.contains("🐳"));
    }

    #[test]
    fn external_edit_causes_conflict() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("services.json");
        let store = MetadataStore::open(&path);
        store.put_service(service("web", "Dev")).unwrap();

        let snap = store.load();
        std::fs::write(&path, r#"{"services":{}}"#).unwrap();

        let err = store.save(&snap.document, &snap.version).unwrap_err();
        assert!(matches!(err, StateError::Conflict));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), r#"{"services":{}}"#);
    }

    #[test]
    fn save_with_current_version_succeeds() {
        let store = MetadataStore::open_in_memory();
        let mut snap = store.load();
        snap.document.category_order = vec!["Other".into()];
        let v1 = store.save(&snap.document, &snap.version).unwrap();
        assert_eq!(store.load().version, v1);
        assert!(store.save(&snap.document, &snap.version).is_err());
    }

    #[test]
    fn concurrent_writers_do_not_lose_updates() {
        let store = MetadataStore::open_in_memory();
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                std::thread::spawn(move || {
                    store.put_service(service(&format!("svc-{i}"), "Dev")).unwrap();
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(store.services().len(), 8);
    }
}
