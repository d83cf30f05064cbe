use std::collections::HashMap;
use std::io;
use std::path::Path;

use thiserror::Error;

use crate::error::I18nError;

/// The flat key/value text table of a single language:
/// - One entry per logical line: `key = value` (or `key: value`)
/// - Comments: `# ...` or `! ...`
/// - Backslash at end of line continues the entry on the next line
/// - Escapes: `\n`, `\r`, `\t`, `\f`, `\\`, `\uXXXX`, `\=`, `\:`
#[derive(Clone, Debug, Default)]
pub struct LanguageTable {
    entries: HashMap<String, String>,
}

impl LanguageTable {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Look up the raw text template for a key. Keys are case-sensitive.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Parse a table from properties-format text.
    ///
    /// Later entries overwrite earlier ones under the same key.
    pub fn parse(src: &str) -> Result<Self, ParseError> {
        let mut table = Self::new();
        let mut lines = src.lines().enumerate();

        while let Some((idx, raw_line)) = lines.next() {
            let line_no = idx + 1;
            let line = raw_line.trim_start();
            if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
                continue;
            }

            // Assemble the logical line: a trailing unescaped backslash
            // continues the entry, with the next line's leading whitespace
            // dropped.
            let mut logical = line.to_string();
            while has_continuation(&logical) {
                logical.pop();
                match lines.next() {
                    Some((_, next)) => logical.push_str(next.trim_start()),
                    None => break,
                }
            }

            let (key, value) = split_entry(&logical, line_no)?;
            table.insert(key, value);
        }

        Ok(table)
    }

    /// Read and parse a table from a file.
    ///
    /// A missing file maps to [`I18nError::ResourceNotFound`]; every other
    /// read or decode failure (I/O, invalid UTF-8, malformed escape) maps
    /// to [`I18nError::ResourceRead`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, I18nError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                I18nError::ResourceNotFound(path.to_path_buf())
            } else {
                I18nError::ResourceRead {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                }
            }
        })?;
        let src = String::from_utf8(bytes).map_err(|_| I18nError::ResourceRead {
            path: path.to_path_buf(),
            reason: "resource is not valid UTF-8".to_string(),
        })?;
        Self::parse(&src).map_err(|e| I18nError::ResourceRead {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }
}

#[derive(Debug, Error)]
#[error("syntax error at line {line}: {msg}")]
pub struct ParseError {
    pub line: usize,
    pub msg: String,
}

/// True if the line ends with an odd number of backslashes, i.e. the final
/// backslash is itself unescaped and marks a continuation.
fn has_continuation(line: &str) -> bool {
    line.chars().rev().take_while(|&c| c == '\\').count() % 2 == 1
}

/// Split a logical line into key and value.
///
/// The key ends at the first unescaped `=`, `:` or whitespace; whitespace
/// around the separator is skipped, and a bare `key` line yields an empty
/// value. Both halves are unescaped.
fn split_entry(line: &str, line_no: usize) -> Result<(String, String), ParseError> {
    let chars: Vec<char> = line.chars().collect();

    let mut key_end = chars.len();
    let mut explicit_sep = false;
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '\\' => i += 2,
            '=' | ':' => {
                key_end = i;
                explicit_sep = true;
                break;
            }
            c if c.is_whitespace() => {
                key_end = i;
                break;
            }
            _ => i += 1,
        }
    }

    let key_raw: String = chars[..key_end].iter().collect();

    let mut v = key_end;
    if explicit_sep {
        v += 1;
    } else {
        // Whitespace-terminated key: an `=` or `:` after the gap is still
        // the separator.
        while v < chars.len() && chars[v].is_whitespace() {
            v += 1;
        }
        if v < chars.len() && (chars[v] == '=' || chars[v] == ':') {
            v += 1;
        }
    }
    while v < chars.len() && chars[v].is_whitespace() {
        v += 1;
    }
    let value_raw: String = chars[v..].iter().collect();

    Ok((unescape(&key_raw, line_no)?, unescape(&value_raw, line_no)?))
}

fn unescape(s: &str, line: usize) -> Result<String, ParseError> {
    let mut out = String::with_capacity(s.len());
    let mut it = s.chars();
    while let Some(c) = it.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match it.next() {
            // Dangling backslash at end of input is dropped.
            None => break,
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('f') => out.push('\u{000C}'),
            Some('u') => {
                let mut code = 0u32;
                for _ in 0..4 {
                    let digit = it
                        .next()
                        .and_then(|h| h.to_digit(16))
                        .ok_or_else(|| ParseError {
                            line,
                            msg: "malformed \\uXXXX escape".to_string(),
                        })?;
                    code = code * 16 + digit;
                }
                let ch = char::from_u32(code).ok_or_else(|| ParseError {
                    line,
                    msg: format!("\\u{code:04x} is not a valid character"),
                })?;
                out.push(ch);
            }
            // Any other escaped character stands for itself (`\\`, `\=`,
            // `\:`, `\#`, ...).
            Some(other) => out.push(other),
        }
    }
    Ok(out)
}
