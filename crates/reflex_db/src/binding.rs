//! Binding traits: the `key` / `key=value` annotations carried by
//! reflection markers.
//!
//! Traits are free-form and ordered; the scanner records them exactly as
//! written (duplicates included) and generators interpret them later.
//! The typed getters here cover the common encodings: booleans, numbers,
//! `;`-separated lists, and `min:max` ranges.

/// One `key` or `key=value` entry from a marker's argument list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Trait {
    /// Trait name as written.
    pub key: String,

    /// Optional value. `None` for bare keys like `PROPERTY(readonly)`.
    pub value: Option<String>,
}

/// Ordered collection of binding traits.
///
/// Duplicate keys are kept: `get_list` merges them, the scalar getters
/// take the first match.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TraitList {
    traits: Vec<Trait>,
}

impl TraitList {
    /// Create an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a trait.
    pub fn push(&mut self, key: impl Into<String>, value: Option<String>) {
        self.traits.push(Trait {
            key: key.into(),
            value,
        });
    }

    /// Append every trait from `other`, preserving order.
    pub fn extend(&mut self, other: TraitList) {
        self.traits.extend(other.traits);
    }

    /// Number of traits.
    #[inline]
    pub fn len(&self) -> usize {
        self.traits.len()
    }

    /// Check whether the list is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.traits.is_empty()
    }

    /// Iterate over the traits in recorded order.
    pub fn iter(&self) -> impl Iterator<Item = &Trait> {
        self.traits.iter()
    }

    // === Queries ===

    /// Check whether `key` appears at all, with or without a value.
    #[inline]
    pub fn has(&self, key: &str) -> bool {
        self.traits.iter().any(|t| t.key == key)
    }

    /// First non-empty value recorded for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.traits
            .iter()
            .filter(|t| t.key == key)
            .find_map(|t| t.value.as_deref())
            .filter(|v| !v.is_empty())
    }

    /// First value for `key`, or `default` when missing or valueless.
    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).unwrap_or(default)
    }

    /// Boolean value for `key`: `true` and `on` (case-insensitive) read
    /// as true, any other value as false, and a missing or valueless key
    /// as `default`.
    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        match self.get(key) {
            Some(v) => v.eq_ignore_ascii_case("true") || v.eq_ignore_ascii_case("on"),
            None => default,
        }
    }

    /// Integer value for `key`, or `default` when missing or unparseable.
    pub fn get_int(&self, key: &str, default: i64) -> i64 {
        self.get(key)
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    /// Float value for `key`, or `default` when missing or unparseable.
    pub fn get_float(&self, key: &str, default: f32) -> f32 {
        self.get(key)
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    /// All `;`-separated items recorded under `key`, merged across
    /// duplicate entries, trimmed, empties dropped.
    pub fn get_list(&self, key: &str) -> Vec<String> {
        let mut items = Vec::new();
        for t in self.traits.iter().filter(|t| t.key == key) {
            let Some(value) = t.value.as_deref() else {
                continue;
            };
            for item in value.split(';') {
                let item = item.trim();
                if !item.is_empty() {
                    items.push(item.to_owned());
                }
            }
        }
        items
    }

    /// `min:max` range for `key`. A missing key or a half that fails to
    /// parse yields `default` unchanged.
    pub fn get_range(&self, key: &str, default: (f32, f32)) -> (f32, f32) {
        let Some(value) = self.get(key) else {
            return default;
        };
        let Some((lo, hi)) = value.split_once(':') else {
            return default;
        };
        match (lo.trim().parse(), hi.trim().parse()) {
            (Ok(lo), Ok(hi)) => (lo, hi),
            _ => default,
        }
    }
}

impl<'a> IntoIterator for &'a TraitList {
    type Item = &'a Trait;
    type IntoIter = std::slice::Iter<'a, Trait>;

    fn into_iter(self) -> Self::IntoIter {
        self.traits.iter()
    }
}
