use std::collections::btree_map;
use std::collections::BTreeMap;

/// Default session timeout in seconds.
pub const DEFAULT_MAX_INACTIVE_INTERVAL: i32 = 1800;

// Named values already rendered as text, kept sorted by name
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Attributes(BTreeMap<String, String>);

impl Attributes {
    pub fn new() -> Self {
        Attributes::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl ToString) -> Option<String> {
        self.0.insert(name.into(), value.to_string())
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.0.remove(name)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, String> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: ToString> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Attributes(
            iter.into_iter()
                .map(|(name, value)| (name.into(), value.to_string()))
                .collect(),
        )
    }
}

/// Server side state tied to a client. Times are epoch milliseconds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    pub id: String,
    pub creation_time: i64,
    pub last_accessed_time: i64,
    /// Seconds; negative means the session never expires.
    pub max_inactive_interval: i32,
    pub is_new: bool,
    pub attributes: Attributes,
}

impl Session {
    pub fn new(id: impl Into<String>, creation_time: i64) -> Self {
        Session {
            id: id.into(),
            creation_time,
            last_accessed_time: creation_time,
            max_inactive_interval: DEFAULT_MAX_INACTIVE_INTERVAL,
            is_new: true,
            attributes: Attributes::new(),
        }
    }
}
