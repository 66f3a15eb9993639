use crate::{AppState, Effect, FacetState, Msg};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::SnapshotReceived {
            records,
            finished,
            error,
        } => {
            state.apply_snapshot(records, finished, error);
            Vec::new()
        }
        Msg::SearchStopped => {
            state.mark_stopped();
            Vec::new()
        }
        Msg::FacetsChanged(facets) => {
            state.set_facets(facets);
            Vec::new()
        }
        Msg::FacetsReset => {
            state.set_facets(FacetState::neutral());
            Vec::new()
        }
        Msg::SortChanged(sort) => {
            if state.facets().sort != sort {
                state.facets_mut().sort = sort;
            }
            Vec::new()
        }
        Msg::ModeOverridden(mode) => {
            state.set_mode_override(mode);
            Vec::new()
        }
        Msg::ProfilesRestored(book) => {
            state.restore_profiles(book);
            Vec::new()
        }
        Msg::ProfileSelected(name) => {
            let result = state.select_profile(name);
            state.set_profile_error(result.err());
            Vec::new()
        }
        Msg::ProfileCreated(name) => {
            let facets = state.facets().clone();
            match state.active_profiles_mut().create(&name, facets) {
                Ok(name) => {
                    state.set_profile_error(None);
                    state.set_selected_profile(Some(name));
                    persist(&state)
                }
                Err(err) => {
                    state.set_profile_error(Some(err));
                    Vec::new()
                }
            }
        }
        Msg::ProfileSaveClicked => {
            let Some(name) = state.selected_profile().map(str::to_string) else {
                return (state, Vec::new());
            };
            let facets = state.facets().clone();
            match state.active_profiles_mut().save(&name, facets) {
                Ok(_) => {
                    state.set_profile_error(None);
                    state.mark_dirty();
                    persist(&state)
                }
                Err(err) => {
                    state.set_profile_error(Some(err));
                    Vec::new()
                }
            }
        }
        Msg::ProfileRenamed { from, to } => match state.active_profiles_mut().rename(&from, &to) {
            Ok(new_name) => {
                state.set_profile_error(None);
                if state.selected_profile() == Some(from.as_str()) {
                    state.set_selected_profile(Some(new_name));
                }
                state.mark_dirty();
                persist(&state)
            }
            Err(err) => {
                state.set_profile_error(Some(err));
                Vec::new()
            }
        },
        Msg::ProfileDeleted(name) => match state.active_profiles_mut().delete(&name) {
            Ok(_) => {
                state.set_profile_error(None);
                if state.selected_profile() == Some(name.as_str()) {
                    state.set_selected_profile(None);
                }
                state.mark_dirty();
                persist(&state)
            }
            Err(err) => {
                state.set_profile_error(Some(err));
                Vec::new()
            }
        },
        Msg::DefaultProfileSet(name) => {
            let result = match name {
                Some(name) => state.active_profiles_mut().set_default(&name),
                None => {
                    state.active_profiles_mut().clear_default();
                    Ok(())
                }
            };
            match result {
                Ok(()) => {
                    state.set_profile_error(None);
                    state.mark_dirty();
                    persist(&state)
                }
                Err(err) => {
                    state.set_profile_error(Some(err));
                    Vec::new()
                }
            }
        }
        Msg::StopClicked => {
            if state.is_terminal() {
                Vec::new()
            } else {
                vec![Effect::StopSearch]
            }
        }
        Msg::RetryClicked => {
            state.clear_records();
            vec![Effect::RetrySearch]
        }
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn persist(state: &AppState) -> Vec<Effect> {
    vec![Effect::PersistProfiles(state.profiles().clone())]
}
