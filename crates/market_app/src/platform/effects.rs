use std::path::PathBuf;

use engine_logging::{engine_error, engine_info, engine_warn};
use market_core::{Effect, Msg};
use market_engine::{EngineHandle, SearchEvent, SearchId};

use super::persistence;

/// Executes the effects produced by `update`.
pub struct EffectRunner<'a> {
    engine: &'a EngineHandle,
    data_dir: PathBuf,
    search_id: Option<SearchId>,
}

impl<'a> EffectRunner<'a> {
    pub fn new(engine: &'a EngineHandle, data_dir: PathBuf) -> Self {
        Self {
            engine,
            data_dir,
            search_id: None,
        }
    }

    pub fn attach(&mut self, search_id: SearchId) {
        self.search_id = Some(search_id);
    }

    pub fn run(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::PersistProfiles(book) => {
                    if let Err(err) = persistence::save_profiles(&self.data_dir, &book) {
                        engine_error!("Failed to persist profiles: {}", err);
                    }
                }
                Effect::StopSearch => match self.search_id {
                    Some(search_id) => {
                        engine_info!("Stopping search {}", search_id);
                        self.engine.stop(search_id);
                    }
                    None => engine_warn!("Stop requested before a search started"),
                },
                Effect::RetrySearch => match self.search_id {
                    Some(search_id) => {
                        engine_info!("Retrying search {}", search_id);
                        self.engine.retry(search_id);
                    }
                    None => engine_warn!("Retry requested before a search started"),
                },
            }
        }
    }
}

/// Translates an engine event into the message the view state understands.
pub fn msg_for_event(event: SearchEvent) -> Msg {
    match event {
        SearchEvent::Snapshot(snapshot) => Msg::SnapshotReceived {
            records: snapshot.records,
            finished: snapshot.finished,
            error: snapshot.error,
        },
        SearchEvent::Progress { search_id, stage } => {
            engine_info!("Search {}: {}", search_id, stage);
            Msg::Tick
        }
        SearchEvent::Stopped { .. } => Msg::SearchStopped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use market_engine::{SearchSnapshot, SearchStage};

    #[test]
    fn engine_events_map_to_messages() {
        let snapshot = SearchEvent::Snapshot(SearchSnapshot {
            search_id: 1,
            records: Vec::new(),
            finished: true,
            error: Some("timeout".to_string()),
        });
        assert_eq!(
            msg_for_event(snapshot),
            Msg::SnapshotReceived {
                records: Vec::new(),
                finished: true,
                error: Some("timeout".to_string()),
            }
        );
        assert_eq!(
            msg_for_event(SearchEvent::Progress {
                search_id: 1,
                stage: SearchStage::Waiting,
            }),
            Msg::Tick
        );
        assert_eq!(
            msg_for_event(SearchEvent::Stopped { search_id: 1 }),
            Msg::SearchStopped
        );
    }
}
