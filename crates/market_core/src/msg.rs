use crate::{FacetState, ModuleRecord, ProfileBook, QueryMode, SortKey};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// Incremental or final snapshot from the extraction controller.
    SnapshotReceived {
        records: Vec<ModuleRecord>,
        finished: bool,
        error: Option<String>,
    },
    /// The search was stopped; collected records stay visible.
    SearchStopped,
    /// UI produced a new facet state.
    FacetsChanged(FacetState),
    /// User cleared every facet.
    FacetsReset,
    SortChanged(SortKey),
    /// Force a mode instead of detecting it from the records.
    ModeOverridden(Option<QueryMode>),
    /// Restore persisted profiles.
    ProfilesRestored(ProfileBook),
    /// User picked a profile (or cleared the selection).
    ProfileSelected(Option<String>),
    /// User saved the live facets under a new name.
    ProfileCreated(String),
    /// User clicked Save for the selected profile.
    ProfileSaveClicked,
    ProfileRenamed { from: String, to: String },
    ProfileDeleted(String),
    DefaultProfileSet(Option<String>),
    StopClicked,
    RetryClicked,
    /// UI/render tick to coalesce rendering.
    Tick,
    /// Fallback for placeholder wiring.
    NoOp,
}
