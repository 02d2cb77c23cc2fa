//! Station alias directory
//!
//! Maps station codes to the names operators know them by. The directory is
//! always rebuilt in full from its source; there are no partial updates.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;

use sten_protocol::ProtocolCode;
use tracing::warn;

use crate::error::EngineError;

/// Display name for codes with no alias
pub const UNKNOWN_ALIAS: &str = "???";

/// Code to display-name lookup
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasDirectory {
    aliases: HashMap<ProtocolCode, String>,
}

impl AliasDirectory {
    /// Create an empty directory
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an alias
    pub fn insert(&mut self, code: ProtocolCode, alias: impl Into<String>) {
        self.aliases.insert(code, alias.into());
    }

    /// Resolve a code, falling back to [`UNKNOWN_ALIAS`]
    pub fn resolve(&self, code: ProtocolCode) -> &str {
        self.aliases
            .get(&code)
            .map(String::as_str)
            .unwrap_or(UNKNOWN_ALIAS)
    }

    /// Look up a code without the fallback
    pub fn get(&self, code: ProtocolCode) -> Option<&str> {
        self.aliases.get(&code).map(String::as_str)
    }

    /// Number of aliases
    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    /// Whether the directory is empty
    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}

/// Source of alias directories
///
/// Shared between the reload path and the worker, hence `Send + Sync`.
pub trait AliasLoader: Send + Sync {
    /// Load the full directory from `path`
    fn load(&self, path: &Path) -> Result<AliasDirectory, EngineError>;
}

/// Loader for headerless `number,alias` CSV files
///
/// Either column may be quoted. Columns past the second are ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct AliasFileLoader;

impl AliasLoader for AliasFileLoader {
    fn load(&self, path: &Path) -> Result<AliasDirectory, EngineError> {
        let text = fs::read_to_string(path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => EngineError::AliasNotFound(path.to_path_buf()),
            _ => EngineError::AliasRead {
                path: path.to_path_buf(),
                source,
            },
        })?;
        Ok(parse_aliases(&text))
    }
}

/// Parse alias rows, skipping malformed ones with a warning
pub fn parse_aliases(text: &str) -> AliasDirectory {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut directory = AliasDirectory::new();

    for (index, row) in text.lines().enumerate() {
        let row = row.trim();
        if row.is_empty() {
            continue;
        }

        let fields = split_fields(row);
        let [number, alias, ..] = fields.as_slice() else {
            warn!("Alias row {} has no alias column: '{}'", index + 1, row);
            continue;
        };
        let Ok(number) = number.parse::<u32>() else {
            warn!("Alias row {} has a bad number: '{}'", index + 1, row);
            continue;
        };

        let code = ProtocolCode(number);
        if directory.get(code).is_some() {
            warn!("Alias row {} redefines {}", index + 1, code);
        }
        directory.insert(code, alias.as_str());
    }

    directory
}

/// Split one CSV row into fields
///
/// A field that opens with `"` runs to the matching close quote, with `""`
/// as an escaped quote, and any text after the close quote is kept as is.
/// An unterminated quoted field keeps its raw text.
fn split_fields(row: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut raw = String::new();
    let mut quoted = false;
    let mut in_quotes = false;
    let mut chars = row.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            raw.push(c);
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    raw.push('"');
                    field.push('"');
                }
                '"' => in_quotes = false,
                _ => field.push(c),
            }
            continue;
        }

        match c {
            ',' => {
                fields.push(finish_field(&field, quoted));
                field.clear();
                raw.clear();
                quoted = false;
            }
            '"' if !quoted && field.trim().is_empty() => {
                raw.push(c);
                field.clear();
                quoted = true;
                in_quotes = true;
            }
            _ => {
                raw.push(c);
                field.push(c);
            }
        }
    }

    if in_quotes {
        fields.push(raw.trim().to_string());
    } else {
        fields.push(finish_field(&field, quoted));
    }
    fields
}

fn finish_field(field: &str, quoted: bool) -> String {
    if quoted {
        field.trim_end().to_string()
    } else {
        field.trim().to_string()
    }
}
