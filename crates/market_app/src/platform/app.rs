use std::path::Path;
use std::time::{Duration, Instant};

use engine_logging::{engine_debug, engine_info, engine_warn};
use market_core::{update, AppState, AppViewModel, FacetState, Msg, QueryMode, RangeFilter};
use market_engine::{EngineHandle, EngineSettings, SearchRequest};

use super::effects::{msg_for_event, EffectRunner};
use super::persistence;
use crate::cli::SearchArgs;

const TICK: Duration = Duration::from_millis(75);

struct Session<'a> {
    state: AppState,
    runner: EffectRunner<'a>,
}

impl Session<'_> {
    fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;
        self.runner.run(effects);
    }
}

/// Facets requested on the command line layered over `base`.
fn facets_from_args(base: &FacetState, args: &SearchArgs) -> FacetState {
    let mut facets = base.clone();
    if let Some(seller) = &args.seller {
        facets.seller = seller.clone();
    }
    if args.min_price.is_some() || args.max_price.is_some() {
        facets.price = RangeFilter::new(
            args.min_price.or(facets.price.min),
            args.max_price.or(facets.price.max),
        );
    }
    facets.statuses.extend(args.statuses.iter().cloned());
    if let Some(sort) = args.sort {
        facets.sort = sort.into();
    }
    facets
}

pub fn run_search(
    args: &SearchArgs,
    settings: EngineSettings,
    data_dir: &Path,
) -> anyhow::Result<AppViewModel> {
    let engine = EngineHandle::new(settings);
    drive_search(&engine, args, data_dir)
}

/// Runs one search on `engine` through the view state machine until it ends,
/// retrying failures and stopping on timeout as the arguments ask.
pub(crate) fn drive_search(
    engine: &EngineHandle,
    args: &SearchArgs,
    data_dir: &Path,
) -> anyhow::Result<AppViewModel> {
    let mut session = Session {
        state: AppState::new(),
        runner: EffectRunner::new(engine, data_dir.to_path_buf()),
    };

    session.dispatch(Msg::ProfilesRestored(persistence::load_profiles(data_dir)));
    if let Some(mode) = args.mode {
        session.dispatch(Msg::ModeOverridden(Some(QueryMode::from(mode))));
    }
    if let Some(profile) = &args.profile {
        session.dispatch(Msg::ProfileSelected(Some(profile.clone())));
        if let Some(err) = session.state.view().profile_error {
            anyhow::bail!(err);
        }
    }
    let facets = facets_from_args(session.state.facets(), args);
    session.dispatch(Msg::FacetsChanged(facets));

    let search_id = engine.start(SearchRequest {
        module_type: args.module_type.clone(),
        module_name: args.name.clone(),
        platform: args.platform.clone(),
    });
    session.runner.attach(search_id);

    let deadline = args
        .timeout_secs
        .map(|secs| Instant::now() + Duration::from_secs(secs));
    let mut retries_left = args.retries;
    let mut stop_requested = false;

    loop {
        let msg = match engine.recv_timeout(TICK) {
            Some(event) if event.search_id() == search_id => msg_for_event(event),
            Some(_) => Msg::NoOp,
            None => Msg::Tick,
        };
        session.dispatch(msg);

        if session.state.consume_dirty() {
            let view = session.state.view();
            engine_debug!(
                "Search {}: {} of {} records visible ({})",
                search_id,
                view.records.len(),
                view.total_count,
                view.mode.label()
            );
        }

        if session.state.is_terminal() {
            let view = session.state.view();
            match view.error {
                Some(error) if !view.stopped && retries_left > 0 => {
                    retries_left -= 1;
                    engine_warn!("Search {} failed ({}); retrying", search_id, error);
                    session.dispatch(Msg::RetryClicked);
                    continue;
                }
                _ => break,
            }
        }

        if !stop_requested && deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            engine_info!("Search {} hit the time limit", search_id);
            stop_requested = true;
            session.dispatch(Msg::StopClicked);
        }
    }

    if let Some(name) = &args.save_as {
        session.dispatch(Msg::ProfileCreated(name.clone()));
        if let Some(err) = session.state.view().profile_error {
            engine_warn!("Profile {:?} not saved: {}", name, err);
        }
    }

    Ok(session.state.view())
}
