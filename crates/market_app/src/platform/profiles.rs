use std::fs;
use std::path::Path;

use anyhow::Context;
use market_core::{FacetState, ProfileBook, QueryMode};

use super::persistence;
use crate::cli::ProfileCommand;

fn listing(book: &ProfileBook, mode: QueryMode) -> String {
    let collection = book.collection(mode);
    if collection.is_empty() {
        return format!("no {} profiles", mode.label());
    }
    collection
        .names()
        .into_iter()
        .map(|name| {
            if collection.default_name() == Some(name.as_str()) {
                format!("* {name}")
            } else {
                format!("  {name}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Executes one profile command against the persisted book and returns the
/// text to print.
pub fn run(command: ProfileCommand, data_dir: &Path) -> anyhow::Result<String> {
    let mut book = persistence::load_profiles(data_dir);

    let output = match command {
        ProfileCommand::List { scope } => return Ok(listing(&book, scope.mode.into())),
        ProfileCommand::Show { name, scope } => {
            let state = book
                .collection(scope.mode.into())
                .get(&name)
                .with_context(|| format!("no profile named {name:?}"))?;
            let pretty = ron::ser::PrettyConfig::new();
            return Ok(ron::ser::to_string_pretty(state, pretty)?);
        }
        ProfileCommand::Delete { name, scope } => {
            book.collection_mut(scope.mode.into()).delete(&name)?;
            format!("deleted {name:?}")
        }
        ProfileCommand::Rename { from, to, scope } => {
            let to = book.collection_mut(scope.mode.into()).rename(&from, &to)?;
            format!("renamed {from:?} to {to:?}")
        }
        ProfileCommand::SetDefault { name, scope } => {
            book.collection_mut(scope.mode.into()).set_default(&name)?;
            format!("{name:?} is now the default")
        }
        ProfileCommand::ClearDefault { scope } => {
            book.collection_mut(scope.mode.into()).clear_default();
            "default cleared".to_string()
        }
        ProfileCommand::Import {
            name,
            file,
            overwrite,
            scope,
        } => {
            let content = fs::read_to_string(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            let state: FacetState = ron::from_str(&content)
                .with_context(|| format!("parsing facet state in {}", file.display()))?;
            let collection = book.collection_mut(scope.mode.into());
            let name = if overwrite {
                collection.save(&name, state.normalized())?
            } else {
                collection.create(&name, state.normalized())?
            };
            format!("imported {name:?}")
        }
    };

    persistence::save_profiles(data_dir, &book)?;
    Ok(output)
}
