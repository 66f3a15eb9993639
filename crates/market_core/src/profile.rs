use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{FacetState, QueryMode};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProfileError {
    #[error("a profile named {0:?} already exists")]
    NameTaken(String),
    #[error("no profile named {0:?}")]
    NotFound(String),
    #[error("profile name must not be empty")]
    EmptyName,
}

/// A named facet-state snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterProfile {
    pub name: String,
    pub state: FacetState,
}

/// The named profiles of one mode plus its default-profile pointer.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileCollection {
    profiles: BTreeMap<String, FacetState>,
    default: Option<String>,
}

fn clean_name(name: &str) -> Result<String, ProfileError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ProfileError::EmptyName);
    }
    Ok(name.to_string())
}

impl ProfileCollection {
    pub fn names(&self) -> Vec<String> {
        self.profiles.keys().cloned().collect()
    }

    pub fn profiles(&self) -> Vec<FilterProfile> {
        self.profiles
            .iter()
            .map(|(name, state)| FilterProfile {
                name: name.clone(),
                state: state.clone(),
            })
            .collect()
    }

    pub fn get(&self, name: &str) -> Option<&FacetState> {
        self.profiles.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.profiles.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Adds a new profile; an existing name is rejected.
    pub fn create(&mut self, name: &str, state: FacetState) -> Result<String, ProfileError> {
        let name = clean_name(name)?;
        if self.profiles.contains_key(&name) {
            return Err(ProfileError::NameTaken(name));
        }
        self.profiles.insert(name.clone(), state);
        Ok(name)
    }

    /// Inserts or overwrites a profile.
    pub fn save(&mut self, name: &str, state: FacetState) -> Result<String, ProfileError> {
        let name = clean_name(name)?;
        self.profiles.insert(name.clone(), state);
        Ok(name)
    }

    /// Moves a profile to a new name, carrying the default pointer along.
    pub fn rename(&mut self, old: &str, new: &str) -> Result<String, ProfileError> {
        let new = clean_name(new)?;
        if old == new {
            return if self.profiles.contains_key(old) {
                Ok(new)
            } else {
                Err(ProfileError::NotFound(old.to_string()))
            };
        }
        if self.profiles.contains_key(&new) {
            return Err(ProfileError::NameTaken(new));
        }
        let state = self
            .profiles
            .remove(old)
            .ok_or_else(|| ProfileError::NotFound(old.to_string()))?;
        self.profiles.insert(new.clone(), state);
        if self.default.as_deref() == Some(old) {
            self.default = Some(new.clone());
        }
        Ok(new)
    }

    /// Removes a profile, clearing the default pointer if it referenced it.
    pub fn delete(&mut self, name: &str) -> Result<FacetState, ProfileError> {
        let state = self
            .profiles
            .remove(name)
            .ok_or_else(|| ProfileError::NotFound(name.to_string()))?;
        if self.default.as_deref() == Some(name) {
            self.default = None;
        }
        Ok(state)
    }

    pub fn set_default(&mut self, name: &str) -> Result<(), ProfileError> {
        if !self.profiles.contains_key(name) {
            return Err(ProfileError::NotFound(name.to_string()));
        }
        self.default = Some(name.to_string());
        Ok(())
    }

    pub fn clear_default(&mut self) {
        self.default = None;
    }

    pub fn default_name(&self) -> Option<&str> {
        self.default.as_deref()
    }

    /// The default profile's state, or the neutral state when none is set.
    pub fn load(&self) -> FacetState {
        self.default
            .as_deref()
            .and_then(|name| self.profiles.get(name))
            .cloned()
            .unwrap_or_default()
    }

    /// Whether the save control should be enabled for the live state.
    pub fn is_dirty(&self, selected: Option<&str>, live: &FacetState) -> bool {
        match selected.and_then(|name| self.profiles.get(name)) {
            Some(saved) => !live.same_as(saved),
            None => !live.is_neutral(),
        }
    }
}

/// Both mode-scoped collections; the unit of persistence.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileBook {
    pub ancestor: ProfileCollection,
    pub trigger: ProfileCollection,
}

impl ProfileBook {
    pub fn collection(&self, mode: QueryMode) -> &ProfileCollection {
        match mode {
            QueryMode::Ancestor => &self.ancestor,
            QueryMode::Trigger => &self.trigger,
        }
    }

    pub fn collection_mut(&mut self, mode: QueryMode) -> &mut ProfileCollection {
        match mode {
            QueryMode::Ancestor => &mut self.ancestor,
            QueryMode::Trigger => &mut self.trigger,
        }
    }
}
