// ABOUTME: Shortcut URL value type: base URL plus ordered, JSON-encoded query params
// ABOUTME: Serializes the query like encodeURIComponent so app URL schemes can decode it

use serde_json::{Map, Value};
use std::borrow::Cow;
use std::fmt;
use std::string::FromUtf8Error;

/// Characters `urlencoding` escapes that `encodeURIComponent` leaves alone.
const SUB_DELIMS: [(&str, &str); 5] = [
    ("%21", "!"),
    ("%27", "'"),
    ("%28", "("),
    ("%29", ")"),
    ("%2A", "*"),
];

/// Percent-encodes everything outside `A-Z a-z 0-9 - _ . ! ~ * ' ( )`.
pub fn encode_component(raw: &str) -> String {
    let mut encoded = urlencoding::encode(raw).into_owned();
    // Each escape is exactly `%XY` and a literal `%` becomes `%25`, so these
    // replacements can only ever hit whole escapes.
    for (escape, literal) in SUB_DELIMS {
        if encoded.contains(escape) {
            encoded = encoded.replace(escape, literal);
        }
    }
    encoded
}

/// Inverse of [`encode_component`]; `+` is read as a space like form encoding.
pub fn decode_component(encoded: &str) -> Result<String, FromUtf8Error> {
    let spaced: Cow<'_, str> = if encoded.contains('+') {
        Cow::Owned(encoded.replace('+', " "))
    } else {
        Cow::Borrowed(encoded)
    };
    urlencoding::decode(&spaced).map(Cow::into_owned)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortcutUrl {
    base: String,
    params: Vec<(String, String)>,
}

impl ShortcutUrl {
    /// `base` is kept verbatim up to any `?`; an existing query is discarded.
    pub fn new(base: &str) -> Self {
        let base = base.split('?').next().unwrap_or_default();
        ShortcutUrl {
            base: base.to_string(),
            params: Vec::new(),
        }
    }

    /// Reads an href produced by [`ShortcutUrl::href`] back into its parts.
    pub fn parse(href: &str) -> Result<Self, FromUtf8Error> {
        let (base, query) = href.split_once('?').unwrap_or((href, ""));
        let mut params = Vec::new();
        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            params.push((decode_component(key)?, decode_component(value)?));
        }
        Ok(ShortcutUrl {
            base: base.to_string(),
            params,
        })
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// Decoded `(key, value)` pairs in insertion order.
    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Appends every entry, keeping any existing values for the same key.
    pub fn add_params(&mut self, params: &Map<String, Value>) -> &mut Self {
        for (key, value) in params {
            self.params.push((key.clone(), value.to_string()));
        }
        self
    }

    /// Replaces the first value of each key and drops the rest; new keys are appended.
    pub fn merge_params(&mut self, params: &Map<String, Value>) -> &mut Self {
        for (key, value) in params {
            self.set(key, value.to_string());
        }
        self
    }

    /// Clears the query, then sets every entry.
    pub fn set_params(&mut self, params: &Map<String, Value>) -> &mut Self {
        self.params.clear();
        self.merge_params(params)
    }

    fn set(&mut self, key: &str, value: String) {
        match self.params.iter().position(|(k, _)| k == key) {
            Some(first) => {
                self.params[first].1 = value;
                let mut index = 0;
                self.params.retain(|(k, _)| {
                    let keep = k != key || index == first;
                    index += 1;
                    keep
                });
            }
            None => self.params.push((key.to_string(), value)),
        }
    }

    /// Query string without the leading `?`.
    pub fn search(&self) -> String {
        self.params
            .iter()
            .map(|(k, v)| format!("{}={}", encode_component(k), encode_component(v)))
            .collect::<Vec<_>>()
            .join("&")
    }

    pub fn href(&self) -> String {
        format!("{}?{}", self.base, self.search())
    }
}

impl fmt::Display for ShortcutUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.href())
    }
}
