//! Named router settings.
//!
//! The router keeps its settings in a concurrent map so they can be read while
//! requests are in flight. Every dispatched request sees a [`Settings`] snapshot
//! in its scope under [`keys::SETTINGS`](crate::container::keys::SETTINGS).

use crate::container::{keys, Scope};
use crate::error::ConfigError;
use crate::extract::FromScope;
use dashmap::DashMap;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// A point-in-time copy of the router settings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Settings {
    values: HashMap<String, Value>,
}

impl Settings {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Deserializes the named setting into `T`.
    ///
    /// `Ok(None)` when the setting is absent, `Err` when it does not fit `T`.
    pub fn get_as<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>, serde_json::Error> {
        self.values.get(name).cloned().map(serde_json::from_value).transpose()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromScope for Settings {
    fn from_scope(scope: &Scope) -> Result<Self, ConfigError> {
        scope.require::<Settings>(keys::SETTINGS).map(|settings| Settings::clone(&settings))
    }
}

#[derive(Debug, Default)]
pub(crate) struct SettingsMap {
    inner: DashMap<String, Value>,
}

impl SettingsMap {
    pub(crate) fn get(&self, name: &str) -> Option<Value> {
        self.inner.get(name).map(|entry| entry.value().clone())
    }

    pub(crate) fn set(&self, name: String, value: Value) {
        self.inner.insert(name, value);
    }

    pub(crate) fn merge(&self, values: Map<String, Value>) {
        for (name, value) in values {
            self.inner.insert(name, value);
        }
    }

    pub(crate) fn snapshot(&self) -> Settings {
        let values = self.inner.iter().map(|entry| (entry.key().clone(), entry.value().clone())).collect();
        Settings { values }
    }
}
