use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde_json::Value;

#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Expected a JSON object mapping keys to text, found {found}")]
    NotAnObject { found: &'static str },
    #[error("Value for key '{key}' must be a string, found {found}")]
    NonStringValue { key: String, found: &'static str },
}

/// Ordered key → text map read from a JSON object.
///
/// Entries keep the order they appear in the document. Keys are unique; when a
/// document repeats a key the last value wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationMap {
    entries: Vec<(String, String)>,
}

impl TranslationMap {
    /// Read a UTF-8 JSON file.
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let content = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let map = Self::from_json_str(&content)?;
        log::info!("Loaded {} entries from {}", map.len(), path.display());
        Ok(map)
    }

    pub fn from_json_str(json: &str) -> Result<Self, LoadError> {
        // Editors on Windows like to prepend a byte-order mark.
        let json = json.strip_prefix('\u{feff}').unwrap_or(json);

        let object = match serde_json::from_str::<Value>(json)? {
            Value::Object(object) => object,
            other => {
                return Err(LoadError::NotAnObject {
                    found: json_type(&other),
                })
            }
        };

        let entries = object
            .into_iter()
            .map(|(key, value)| match value {
                Value::String(text) => Ok((key, text)),
                other => Err(LoadError::NonStringValue {
                    key,
                    found: json_type(&other),
                }),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for TranslationMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::default();
        let mut index: HashMap<String, usize> = HashMap::new();
        for (key, text) in iter {
            let (key, text) = (key.into(), text.into());
            match index.get(&key) {
                Some(&at) => map.entries[at].1 = text,
                None => {
                    index.insert(key.clone(), map.entries.len());
                    map.entries.push((key, text));
                }
            }
        }
        map
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
