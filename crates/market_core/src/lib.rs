//! Market core: pure record model, faceted query engine, filter profiles,
//! poll policy, and the view state machine.
mod effect;
mod facet;
mod msg;
pub mod parse;
mod poll;
mod profile;
pub mod query;
mod record;
mod schema;
mod state;
mod store;
mod update;
mod view_model;

pub use effect::Effect;
pub use facet::{FacetState, RangeFilter, SortKey};
pub use msg::Msg;
pub use poll::{PollDecision, PollObservation, PollPolicy, PollTracker};
pub use profile::{FilterProfile, ProfileBook, ProfileCollection, ProfileError};
pub use query::{evaluate, evaluate_indices, passes, sort_records};
pub use record::{DerivedFields, ModuleRecord, Stat};
pub use schema::{compare_status, FacetSchema, NumericRange, QueryMode};
pub use state::AppState;
pub use store::RecordStore;
pub use update::update;
pub use view_model::AppViewModel;
