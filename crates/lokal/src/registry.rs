use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;

use regex::{NoExpand, Regex, RegexBuilder};
use tracing::debug;

use crate::error::I18nError;
use crate::table::LanguageTable;

/// Matches any placeholder `([...])`, shortest span first.
static ANY_PLACEHOLDER: OnceLock<Regex> = OnceLock::new();

fn any_placeholder() -> &'static Regex {
    ANY_PLACEHOLDER.get_or_init(|| Regex::new(r"\(\[.*?\]\)").unwrap())
}

/// Matches the exact placeholder `([tag])`, ignoring the tag's case.
fn tag_placeholder(tag: &str) -> Regex {
    RegexBuilder::new(&format!(r"\(\[{}\]\)", regex::escape(tag)))
        .case_insensitive(true)
        .build()
        .unwrap()
}

/// Registry of language tables with a designated default language.
///
/// Each language identifier maps to one [`LanguageTable`]; the default
/// language backs the no-language lookup forms ([`text`](Self::text) and
/// friends) and serves as the single fallback step when a key is missing
/// from another language's table.
///
/// The registry is plain mutable state with no internal locking. Callers
/// sharing one across threads wrap it themselves (see [`crate::global`]
/// for a ready-made `RwLock`-wrapped process-wide instance).
///
/// # Example
///
/// ```
/// use lokal::{LanguageRegistry, LanguageTable};
///
/// let mut table = LanguageTable::new();
/// table.insert("greeting", "How are you, ([Name]).");
///
/// let mut registry = LanguageRegistry::new();
/// registry.add_table("english", table, true);
///
/// let text = registry.text_tagged("greeting", &[("Name", "Marcel")]).unwrap();
/// assert_eq!(text.as_deref(), Some("How are you, Marcel."));
/// ```
#[derive(Debug, Default)]
pub struct LanguageRegistry {
    tables: HashMap<String, LanguageTable>,
    default_language: Option<String>,
}

impl LanguageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn load_language(
        &mut self,
        path: &Path,
        language: &str,
        as_default: bool,
    ) -> Result<(), I18nError> {
        let table = LanguageTable::from_file(path)?;
        debug!(
            "loaded language '{}' ({} entries) from {}",
            language,
            table.len(),
            path.display()
        );
        self.add_table(language, table, as_default);
        Ok(())
    }

    /// Drop every loaded language, then load `path` under `language` as the
    /// sole entry and mark it default.
    ///
    /// If the load fails the clear has already happened: the registry is
    /// left empty with no default. Callers needing atomicity keep their own
    /// snapshot.
    pub fn set_language(
        &mut self,
        path: impl AsRef<Path>,
        language: &str,
    ) -> Result<(), I18nError> {
        self.tables.clear();
        self.default_language = None;
        self.load_language(path.as_ref(), language, true)
    }

    /// Load `path` under `language` alongside the languages already
    /// loaded, optionally promoting it to default. An existing table under
    /// the same identifier is replaced.
    pub fn add_language(
        &mut self,
        path: impl AsRef<Path>,
        language: &str,
        as_default: bool,
    ) -> Result<(), I18nError> {
        self.load_language(path.as_ref(), language, as_default)
    }

    /// Insert a pre-built table without touching the filesystem.
    pub fn add_table(&mut self, language: &str, table: LanguageTable, as_default: bool) {
        self.tables.insert(language.to_string(), table);
        if as_default {
            self.default_language = Some(language.to_string());
        }
    }

    /// Remove a language unless it is the current default.
    ///
    /// Returns false (and leaves the registry untouched) when `language`
    /// is the default; the comparison here is exact, not case-insensitive.
    /// Returns true otherwise, whether or not a table was loaded under
    /// that identifier.
    pub fn remove_language(&mut self, language: &str) -> bool {
        if self.default_language.as_deref() == Some(language) {
            return false;
        }
        if self.tables.remove(language).is_some() {
            debug!("removed language '{}'", language);
        }
        true
    }

    /// Make an already-loaded language the default.
    pub fn set_default_language(&mut self, language: &str) -> Result<(), I18nError> {
        if !self.tables.contains_key(language) {
            return Err(I18nError::LanguageNotFound(language.to_string()));
        }
        debug!("default language set to '{}'", language);
        self.default_language = Some(language.to_string());
        Ok(())
    }

    pub fn default_language(&self) -> Option<&str> {
        self.default_language.as_deref()
    }

    /// True iff a default is set and equals `language` case-insensitively.
    pub fn is_default_language(&self, language: &str) -> bool {
        self.default_language
            .as_deref()
            .is_some_and(|default| default.eq_ignore_ascii_case(language))
    }

    pub fn is_language_loaded(&self, language: &str) -> bool {
        self.tables.contains_key(language)
    }

    /// Identifiers of all loaded languages, in no particular order.
    pub fn languages(&self) -> Vec<&str> {
        self.tables.keys().map(String::as_str).collect()
    }

    /// Raw text for `key` in the default language, without substitution.
    pub fn text(&self, key: &str) -> Result<Option<String>, I18nError> {
        self.text_with(key, &[])
    }

    /// Text for `key` in the default language, with positional
    /// substitution.
    pub fn text_with(
        &self,
        key: &str,
        replacements: &[&str],
    ) -> Result<Option<String>, I18nError> {
        let default = self
            .default_language
            .as_deref()
            .ok_or(I18nError::NoDefaultLanguage)?;
        self.text_of(default, key, replacements)
    }

    /// Text for `key` in the default language, with tag substitution.
    pub fn text_tagged(
        &self,
        key: &str,
        pairs: &[(&str, &str)],
    ) -> Result<Option<String>, I18nError> {
        let default = self
            .default_language
            .as_deref()
            .ok_or(I18nError::NoDefaultLanguage)?;
        self.text_of_tagged(default, key, pairs)
    }

    /// Text for `key` in `language`, with positional substitution.
    ///
    /// Each replacement consumes the first remaining placeholder, left to
    /// right. Extra placeholders stay untouched; extra replacements are
    /// ignored. Returns `Ok(None)` when the key resolves nowhere.
    pub fn text_of(
        &self,
        language: &str,
        key: &str,
        replacements: &[&str],
    ) -> Result<Option<String>, I18nError> {
        Ok(self
            .lookup(language, key)?
            .map(|text| replace_positional(text, replacements)))
    }

    /// Text for `key` in `language`, with tag substitution.
    ///
    /// Each `(tag, replacement)` pair replaces every `([tag])` placeholder
    /// (tag matched case-insensitively), pairs applied in argument order
    /// against the current string state.
    pub fn text_of_tagged(
        &self,
        language: &str,
        key: &str,
        pairs: &[(&str, &str)],
    ) -> Result<Option<String>, I18nError> {
        Ok(self
            .lookup(language, key)?
            .map(|text| replace_tagged(text, pairs)))
    }

    /// Resolve `key` against `language`, consulting the default language's
    /// table once when the key is absent and `language` is not the default.
    fn lookup(&self, language: &str, key: &str) -> Result<Option<&str>, I18nError> {
        let table = self
            .tables
            .get(language)
            .ok_or_else(|| I18nError::LanguageNotFound(language.to_string()))?;
        if let Some(text) = table.get(key) {
            return Ok(Some(text));
        }
        if !self.is_default_language(language) {
            if let Some(fallback) = self
                .default_language
                .as_deref()
                .and_then(|default| self.tables.get(default))
            {
                return Ok(fallback.get(key));
            }
        }
        Ok(None)
    }
}

fn replace_positional(text: &str, replacements: &[&str]) -> String {
    let mut out = text.to_string();
    for &replacement in replacements {
        out = any_placeholder()
            .replacen(&out, 1, NoExpand(replacement))
            .into_owned();
    }
    out
}

fn replace_tagged(text: &str, pairs: &[(&str, &str)]) -> String {
    let mut out = text.to_string();
    for &(tag, replacement) in pairs {
        out = tag_placeholder(tag)
            .replace_all(&out, NoExpand(replacement))
            .into_owned();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn english_registry() -> LanguageRegistry {
        let mut table = LanguageTable::new();
        table.insert("test", "How are you, ([Name]).");
        table.insert("pair", "([from]) to ([to])");
        table.insert("plain", "No placeholders here.");

        let mut registry = LanguageRegistry::new();
        registry.add_table("english", table, true);
        registry
    }

    #[test]
    fn raw_text_is_returned_unchanged() {
        let registry = english_registry();
        assert_eq!(
            registry.text("test").unwrap().as_deref(),
            Some("How are you, ([Name]).")
        );
    }

    #[test]
    fn positional_replaces_first_placeholder() {
        let registry = english_registry();
        assert_eq!(
            registry.text_with("test", &["Marcel"]).unwrap().as_deref(),
            Some("How are you, Marcel.")
        );
    }

    #[test]
    fn positional_replaces_in_argument_order() {
        let registry = english_registry();
        assert_eq!(
            registry.text_with("pair", &["here", "there"]).unwrap().as_deref(),
            Some("here to there")
        );
    }

    #[test]
    fn positional_leaves_extra_placeholders() {
        let registry = english_registry();
        assert_eq!(
            registry.text_with("pair", &["here"]).unwrap().as_deref(),
            Some("here to ([to])")
        );
    }

    #[test]
    fn positional_ignores_extra_replacements() {
        let registry = english_registry();
        assert_eq!(
            registry
                .text_with("test", &["Marcel", "Hey"])
                .unwrap()
                .as_deref(),
            Some("How are you, Marcel.")
        );
    }

    #[test]
    fn positional_replacement_text_is_literal() {
        let registry = english_registry();
        assert_eq!(
            registry.text_with("test", &["$0"]).unwrap().as_deref(),
            Some("How are you, $0.")
        );
    }

    #[test]
    fn tagged_matches_case_insensitively() {
        let registry = english_registry();
        assert_eq!(
            registry
                .text_tagged("test", &[("name", "Marcel")])
                .unwrap()
                .as_deref(),
            Some("How are you, Marcel.")
        );
    }

    #[test]
    fn first_pair_wins_for_a_shared_tag() {
        let registry = english_registry();
        assert_eq!(
            registry
                .text_tagged("test", &[("Name", "Hey"), ("Name", "Fail")])
                .unwrap()
                .as_deref(),
            Some("How are you, Hey.")
        );
    }

    #[test]
    fn tagged_replaces_all_occurrences() {
        let mut table = LanguageTable::new();
        table.insert("twice", "([word]) and ([WORD])");
        let mut registry = LanguageRegistry::new();
        registry.add_table("english", table, true);

        assert_eq!(
            registry
                .text_tagged("twice", &[("word", "again")])
                .unwrap()
                .as_deref(),
            Some("again and again")
        );
    }

    #[test]
    fn tagged_ignores_unmatched_tags() {
        let registry = english_registry();
        assert_eq!(
            registry
                .text_tagged("test", &[("Nope", "x")])
                .unwrap()
                .as_deref(),
            Some("How are you, ([Name]).")
        );
    }

    #[test]
    fn tag_metacharacters_are_literal() {
        let mut table = LanguageTable::new();
        table.insert("odd", "value: ([a.b])");
        let mut registry = LanguageRegistry::new();
        registry.add_table("english", table, true);

        // `.` must not act as a wildcard in the tag.
        assert_eq!(
            registry
                .text_tagged("odd", &[("aXb", "nope")])
                .unwrap()
                .as_deref(),
            Some("value: ([a.b])")
        );
        assert_eq!(
            registry
                .text_tagged("odd", &[("a.b", "yes")])
                .unwrap()
                .as_deref(),
            Some("value: yes")
        );
    }

    #[test]
    fn missing_key_in_default_language_is_none() {
        let registry = english_registry();
        assert_eq!(registry.text_of("english", "missing", &[]).unwrap(), None);
    }

    #[test]
    fn missing_key_falls_back_to_default_language() {
        let mut registry = english_registry();
        let mut german = LanguageTable::new();
        german.insert("greeting", "Hallo");
        registry.add_table("german", german, false);

        assert_eq!(
            registry.text_of("german", "plain", &[]).unwrap().as_deref(),
            Some("No placeholders here.")
        );
        assert_eq!(registry.text_of("german", "missing", &[]).unwrap(), None);
    }

    #[test]
    fn unknown_language_is_an_error() {
        let registry = english_registry();
        let err = registry.text_of("klingon", "test", &[]).unwrap_err();
        assert!(matches!(err, I18nError::LanguageNotFound(l) if l == "klingon"));
    }

    #[test]
    fn no_default_language_is_an_error() {
        let registry = LanguageRegistry::new();
        let err = registry.text("test").unwrap_err();
        assert!(matches!(err, I18nError::NoDefaultLanguage));
    }

    #[test]
    fn remove_refuses_the_default_language() {
        let mut registry = english_registry();
        assert!(!registry.remove_language("english"));
        assert!(registry.is_language_loaded("english"));
    }

    #[test]
    fn remove_default_comparison_is_case_sensitive() {
        let mut registry = english_registry();
        // Lookup treats "ENGLISH" as the default, removal does not.
        assert!(registry.is_default_language("ENGLISH"));
        assert!(registry.remove_language("ENGLISH"));
    }

    #[test]
    fn remove_drops_a_non_default_language() {
        let mut registry = english_registry();
        registry.add_table("german", LanguageTable::new(), false);

        assert!(registry.remove_language("german"));
        assert!(!registry.is_language_loaded("german"));
    }

    #[test]
    fn remove_of_an_unloaded_language_returns_true() {
        let mut registry = english_registry();
        assert!(registry.remove_language("klingon"));
    }

    #[test]
    fn set_default_requires_a_loaded_language() {
        let mut registry = english_registry();
        let err = registry.set_default_language("german").unwrap_err();
        assert!(matches!(err, I18nError::LanguageNotFound(_)));
        assert_eq!(registry.default_language(), Some("english"));
    }

    #[test]
    fn set_default_switches_the_default() {
        let mut registry = english_registry();
        registry.add_table("german", LanguageTable::new(), false);

        registry.set_default_language("german").unwrap();
        assert_eq!(registry.default_language(), Some("german"));
        assert!(registry.is_default_language("german"));
        assert!(!registry.is_default_language("english"));
    }

    #[test]
    fn is_default_language_without_a_default() {
        let registry = LanguageRegistry::new();
        assert!(!registry.is_default_language("english"));
    }

    #[test]
    fn add_table_can_promote_to_default() {
        let mut registry = english_registry();
        registry.add_table("german", LanguageTable::new(), true);
        assert_eq!(registry.default_language(), Some("german"));
    }

    #[test]
    fn languages_lists_loaded_identifiers() {
        let mut registry = english_registry();
        registry.add_table("german", LanguageTable::new(), false);

        let mut languages = registry.languages();
        languages.sort_unstable();
        assert_eq!(languages, vec!["english", "german"]);
    }
}
