//! Market engine: page automation, listing extraction, and search execution.
mod chromium;
mod controller;
mod engine;
mod extract;
mod persist;
pub mod scripts;
mod settings;
mod surface;
mod types;

pub use chromium::{find_chromium, ChromiumFactory, ChromiumSurface};
pub use controller::{run_search, ChannelEventSink, EventSink, SearchContext, SearchOutcome};
pub use engine::EngineHandle;
pub use extract::{
    extract_ancestor, extract_listing, extract_trigger, normalize_price, CompiledSelectors,
    ListingExtractor,
};
pub use persist::{ensure_data_dir, read_optional, AtomicFileWriter, PersistError};
pub use settings::{EngineSettings, ListingSelectors};
pub use surface::{PageSurface, SurfaceError, SurfaceFactory};
pub use types::{
    SearchError, SearchEvent, SearchId, SearchRequest, SearchSnapshot, SearchStage,
};
