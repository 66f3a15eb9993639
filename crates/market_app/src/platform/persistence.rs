use std::path::{Path, PathBuf};

use engine_logging::{engine_info, engine_warn};
use market_core::ProfileBook;
use market_engine::{read_optional, AtomicFileWriter, PersistError};

pub const PROFILES_FILENAME: &str = "profiles.ron";

/// Loads both profile collections. A missing file is a fresh install; an
/// unreadable or corrupt one is reported and treated the same way.
pub(crate) fn load_profiles(data_dir: &Path) -> ProfileBook {
    let path = data_dir.join(PROFILES_FILENAME);
    let content = match read_optional(&path) {
        Ok(Some(text)) => text,
        Ok(None) => return ProfileBook::default(),
        Err(err) => {
            engine_warn!("Failed to read profiles from {:?}: {}", path, err);
            return ProfileBook::default();
        }
    };

    match ron::from_str::<ProfileBook>(&content) {
        Ok(book) => {
            engine_info!(
                "Loaded {} ancestor and {} trigger profiles from {:?}",
                book.ancestor.len(),
                book.trigger.len(),
                path
            );
            book
        }
        Err(err) => {
            engine_warn!("Failed to parse profiles from {:?}: {}", path, err);
            ProfileBook::default()
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum SaveError {
    #[error("serializing profiles: {0}")]
    Serialize(#[from] ron::Error),
    #[error(transparent)]
    Persist(#[from] PersistError),
}

pub(crate) fn save_profiles(data_dir: &Path, book: &ProfileBook) -> Result<PathBuf, SaveError> {
    let pretty = ron::ser::PrettyConfig::new();
    let content = ron::ser::to_string_pretty(book, pretty)?;
    let path = AtomicFileWriter::new(data_dir).write(PROFILES_FILENAME, &content)?;
    engine_info!("Saved profiles to {:?}", path);
    Ok(path)
}
