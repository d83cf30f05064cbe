//! Language registry and text lookup
//!
//! Goals:
//! - Load per-language key/value text tables from properties-format files
//! - Pick a default language and resolve keys against it (or any loaded
//!   language), with a single fallback step to the default's table
//! - Substitute `([...])` placeholders either positionally or by tag name
//!
//! ```
//! use lokal::{LanguageRegistry, LanguageTable};
//!
//! let table = LanguageTable::parse("test = How are you, ([Name]).").unwrap();
//!
//! let mut registry = LanguageRegistry::new();
//! registry.add_table("english", table, true);
//!
//! assert_eq!(
//!     registry.text_with("test", &["Marcel"]).unwrap().as_deref(),
//!     Some("How are you, Marcel.")
//! );
//! assert_eq!(
//!     registry.text_tagged("test", &[("name", "Hey")]).unwrap().as_deref(),
//!     Some("How are you, Hey.")
//! );
//! ```
//!
//! File-backed registries use [`LanguageRegistry::set_language`] /
//! [`LanguageRegistry::add_language`]; [`global()`] offers a process-wide
//! instance behind an `RwLock` for applications that want one.

mod error;
mod global;
mod registry;
mod table;

pub use error::I18nError;
pub use global::global;
pub use registry::LanguageRegistry;
pub use table::{LanguageTable, ParseError};

/// Convenience macro for building a tag-replacement slice.
///
/// Examples:
/// - `tags!(Name: "Marcel")`
/// - `tags!(from: "here", to: "there")`
#[macro_export]
macro_rules! tags {
    ($($tag:ident : $value:expr),* $(,)?) => {
        &[$((stringify!($tag), $value)),*]
    };
}
