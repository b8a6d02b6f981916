use crate::utils::parse::{parse_bool, parse_int};
use std::collections::HashMap;

/// Implementations only supply [`Env::get`] and [`Env::all`]; the typed
/// accessors share one parsing policy so every source fails soft the same way.
pub trait Env: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn all(&self) -> HashMap<String, String>;

    fn int(&self, key: &str, default: i64) -> i64 {
        parse_int(self.get(key).as_deref(), default)
    }

    fn bool(&self, key: &str, default: bool) -> bool {
        parse_bool(self.get(key).as_deref(), default)
    }

    /// First non-empty value among `keys`, in order.
    fn first_non_empty(&self, keys: &[&str]) -> Option<String> {
        keys.iter()
            .filter_map(|key| self.get(key))
            .find(|value| !value.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MapEnv {
    values: HashMap<String, String>,
}

impl MapEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_process() -> Self {
        std::env::vars().collect()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }
}

impl<K, V> FromIterator<(K, V)> for MapEnv
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl Env for MapEnv {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn all(&self) -> HashMap<String, String> {
        self.values.clone()
    }
}
