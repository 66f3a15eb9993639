use crate::query::evaluate;
use crate::view_model::AppViewModel;
use crate::{
    FacetSchema, FacetState, ModuleRecord, ProfileBook, ProfileCollection, ProfileError,
    QueryMode,
};

/// State of one interactive view over a search's records.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    records: Vec<ModuleRecord>,
    schema: FacetSchema,
    facets: FacetState,
    mode_override: Option<QueryMode>,
    profiles: ProfileBook,
    selected_profile: Option<String>,
    finished: bool,
    stopped: bool,
    error: Option<String>,
    profile_error: Option<String>,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> AppViewModel {
        let mode = self.mode();
        let collection = self.profiles.collection(mode);
        AppViewModel {
            mode,
            records: evaluate(&self.records, &self.facets, mode),
            total_count: self.records.len(),
            schema: self.schema.clone(),
            facets: self.facets.clone(),
            save_enabled: collection.is_dirty(self.selected_profile.as_deref(), &self.facets),
            selected_profile: self.selected_profile.clone(),
            profile_names: collection.names(),
            default_profile: collection.default_name().map(str::to_string),
            finished: self.finished,
            stopped: self.stopped,
            error: self.error.clone(),
            profile_error: self.profile_error.clone(),
            dirty: self.dirty,
        }
    }

    /// Effective mode: the override when set, otherwise detected.
    pub fn mode(&self) -> QueryMode {
        self.mode_override
            .unwrap_or_else(|| QueryMode::detect(&self.records))
    }

    /// True once the search finished, failed, or was stopped.
    pub fn is_terminal(&self) -> bool {
        self.finished || self.stopped
    }

    pub fn facets(&self) -> &FacetState {
        &self.facets
    }

    pub fn records(&self) -> &[ModuleRecord] {
        &self.records
    }

    pub fn profiles(&self) -> &ProfileBook {
        &self.profiles
    }

    /// Returns whether a render is pending and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn active_profiles(&self) -> &ProfileCollection {
        self.profiles.collection(self.mode())
    }

    pub(crate) fn active_profiles_mut(&mut self) -> &mut ProfileCollection {
        let mode = self.mode();
        self.profiles.collection_mut(mode)
    }

    /// Accepts a full snapshot. Growth of the current record list is folded
    /// into the schema incrementally; anything else triggers rediscovery.
    pub(crate) fn apply_snapshot(
        &mut self,
        records: Vec<ModuleRecord>,
        finished: bool,
        error: Option<String>,
    ) {
        let mode_before = self.mode();
        let grows = records.len() >= self.records.len()
            && records[..self.records.len()] == self.records[..];
        if grows {
            self.schema.extend(&records[self.records.len()..]);
        } else {
            self.schema = FacetSchema::discover(&records);
        }
        self.records = records;
        self.finished = finished;
        self.error = error;
        self.stopped = false;

        // Detection only seeds untouched facets; live edits and an explicit
        // profile survive a mode switch.
        if self.mode() != mode_before
            && self.selected_profile.is_none()
            && self.facets.is_neutral()
        {
            self.apply_default_profile();
        }
        self.mark_dirty();
    }

    pub(crate) fn mark_stopped(&mut self) {
        self.stopped = true;
        self.mark_dirty();
    }

    pub(crate) fn clear_records(&mut self) {
        self.records.clear();
        self.schema = FacetSchema::default();
        self.finished = false;
        self.stopped = false;
        self.error = None;
        self.mark_dirty();
    }

    pub(crate) fn set_facets(&mut self, facets: FacetState) {
        if self.facets != facets {
            self.facets = facets;
            self.mark_dirty();
        }
    }

    pub(crate) fn facets_mut(&mut self) -> &mut FacetState {
        self.mark_dirty();
        &mut self.facets
    }

    pub(crate) fn set_mode_override(&mut self, mode: Option<QueryMode>) {
        let before = self.mode();
        self.mode_override = mode;
        if self.mode() != before {
            self.apply_default_profile();
        }
        self.mark_dirty();
    }

    pub(crate) fn restore_profiles(&mut self, book: ProfileBook) {
        self.profiles = book;
        if self.selected_profile.is_none() && self.facets.is_neutral() {
            self.apply_default_profile();
        }
        self.mark_dirty();
    }

    /// Loads the active mode's default profile into the facets.
    fn apply_default_profile(&mut self) {
        let collection = self.active_profiles();
        let selected = collection.default_name().map(str::to_string);
        let facets = collection.load();
        self.selected_profile = selected;
        self.facets = facets;
    }

    pub(crate) fn select_profile(&mut self, name: Option<String>) -> Result<(), ProfileError> {
        match name {
            Some(name) => {
                let facets = self
                    .active_profiles()
                    .get(&name)
                    .cloned()
                    .ok_or_else(|| ProfileError::NotFound(name.clone()))?;
                self.facets = facets;
                self.selected_profile = Some(name);
            }
            None => self.selected_profile = None,
        }
        self.mark_dirty();
        Ok(())
    }

    pub(crate) fn selected_profile(&self) -> Option<&str> {
        self.selected_profile.as_deref()
    }

    pub(crate) fn set_selected_profile(&mut self, name: Option<String>) {
        self.selected_profile = name;
        self.mark_dirty();
    }

    pub(crate) fn set_profile_error(&mut self, error: Option<ProfileError>) {
        let error = error.map(|err| err.to_string());
        if self.profile_error != error {
            self.profile_error = error;
            self.mark_dirty();
        }
    }
}
