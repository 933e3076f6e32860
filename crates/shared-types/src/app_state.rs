//! # Application State Container
//!
//! The full application state is an ordered sequence of
//! `(module_name, opaque_bytes)` pairs. Nothing outside a module looks inside
//! its bytes.
//!
//! ## Encoding
//!
//! In a genesis document the state is a JSON object keyed by module name, in
//! sequence order, with each module's bytes embedded verbatim. Module bytes
//! must be a JSON value with no surrounding whitespace; anything else fails
//! to encode, so every encoded state decodes to the same bytes.

use serde::de::{self, MapAccess, Visitor};
use serde::ser::{self, SerializeMap};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::value::RawValue;
use sha2::{Digest, Sha256};
use std::fmt;

use crate::entities::Hash;
use crate::errors::AppStateError;

/// One module's slice of the application state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleState {
    pub name: String,
    pub data: Vec<u8>,
}

/// Full application state snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    modules: Vec<ModuleState>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from pairs, rejecting duplicate module names.
    pub fn from_modules<I, N>(modules: I) -> Result<Self, AppStateError>
    where
        I: IntoIterator<Item = (N, Vec<u8>)>,
        N: Into<String>,
    {
        let mut state = Self::new();
        for (name, data) in modules {
            let name = name.into();
            if state.contains(&name) {
                return Err(AppStateError::DuplicateModule(name));
            }
            state.modules.push(ModuleState { name, data });
        }
        Ok(state)
    }

    /// Replace the module's bytes, or append the module if it is new.
    pub fn insert(&mut self, name: impl Into<String>, data: Vec<u8>) {
        let name = name.into();
        match self.modules.iter_mut().find(|m| m.name == name) {
            Some(existing) => existing.data = data,
            None => self.modules.push(ModuleState { name, data }),
        }
    }

    /// Serialize `value` as compact JSON and store it under `name`.
    pub fn insert_json<T: Serialize>(
        &mut self,
        name: impl Into<String>,
        value: &T,
    ) -> Result<(), serde_json::Error> {
        let data = serde_json::to_vec(value)?;
        self.insert(name, data);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.modules
            .iter()
            .find(|m| m.name == name)
            .map(|m| m.data.as_slice())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ModuleState> {
        self.modules.iter()
    }

    pub fn module_names(&self) -> impl Iterator<Item = &str> {
        self.modules.iter().map(|m| m.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn into_modules(self) -> Vec<ModuleState> {
        self.modules
    }

    /// SHA-256 over the length-prefixed `(name, bytes)` sequence.
    ///
    /// Two states are byte-identical iff their digests match.
    pub fn digest(&self) -> Hash {
        let mut hasher = Sha256::new();
        hasher.update((self.modules.len() as u64).to_be_bytes());
        for module in &self.modules {
            hasher.update((module.name.len() as u64).to_be_bytes());
            hasher.update(module.name.as_bytes());
            hasher.update((module.data.len() as u64).to_be_bytes());
            hasher.update(&module.data);
        }
        hasher.finalize().into()
    }
}

impl<'a> IntoIterator for &'a AppState {
    type Item = &'a ModuleState;
    type IntoIter = std::slice::Iter<'a, ModuleState>;

    fn into_iter(self) -> Self::IntoIter {
        self.modules.iter()
    }
}

impl Serialize for AppState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.modules.len()))?;
        for module in &self.modules {
            let text = std::str::from_utf8(&module.data).map_err(|e| {
                ser::Error::custom(format!("module {:?} state is not UTF-8: {}", module.name, e))
            })?;
            let raw: &RawValue = serde_json::from_str(text).map_err(|e| {
                ser::Error::custom(format!("module {:?} state is not JSON: {}", module.name, e))
            })?;
            // A decoder reads back `raw.get()`, which drops surrounding whitespace.
            if raw.get().len() != text.len() {
                return Err(ser::Error::custom(format!(
                    "module {:?} state has whitespace around its JSON value",
                    module.name
                )));
            }
            map.serialize_entry(&module.name, raw)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for AppState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(AppStateVisitor)
    }
}

struct AppStateVisitor;

impl<'de> Visitor<'de> for AppStateVisitor {
    type Value = AppState;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of module name to module state")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<AppState, A::Error> {
        let mut state = AppState::new();
        while let Some((name, raw)) = access.next_entry::<String, Box<RawValue>>()? {
            if state.contains(&name) {
                return Err(de::Error::custom(AppStateError::DuplicateModule(name)));
            }
            state.modules.push(ModuleState {
                name,
                data: raw.get().as_bytes().to_vec(),
            });
        }
        Ok(state)
    }
}
