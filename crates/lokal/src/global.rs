use std::sync::{OnceLock, RwLock};

use crate::registry::LanguageRegistry;

static GLOBAL_REGISTRY: OnceLock<RwLock<LanguageRegistry>> = OnceLock::new();

/// Process-wide registry for applications that want one shared instance.
///
/// Lazily initialized on first access. Mutations take the write lock,
/// lookups the read lock; the core [`LanguageRegistry`] type itself never
/// depends on this and stays directly constructible for tests and
/// multi-registry setups.
///
/// ```
/// use lokal::{global, LanguageTable};
///
/// let mut table = LanguageTable::new();
/// table.insert("app.title", "My Application");
/// global().write().unwrap().add_table("english", table, true);
///
/// let title = global().read().unwrap().text("app.title").unwrap();
/// assert_eq!(title.as_deref(), Some("My Application"));
/// ```
pub fn global() -> &'static RwLock<LanguageRegistry> {
    GLOBAL_REGISTRY.get_or_init(|| RwLock::new(LanguageRegistry::new()))
}
