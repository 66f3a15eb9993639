use crate::{FacetSchema, FacetState, ModuleRecord, QueryMode};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppViewModel {
    pub mode: QueryMode,
    /// Filtered and sorted records.
    pub records: Vec<ModuleRecord>,
    /// Records in the set before filtering.
    pub total_count: usize,
    pub schema: FacetSchema,
    pub facets: FacetState,
    /// Save control enablement (dirty-state contract).
    pub save_enabled: bool,
    pub selected_profile: Option<String>,
    pub profile_names: Vec<String>,
    pub default_profile: Option<String>,
    pub finished: bool,
    pub stopped: bool,
    pub error: Option<String>,
    pub profile_error: Option<String>,
    pub dirty: bool,
}
