use crate::ProfileBook;

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Write the profile book to durable storage.
    PersistProfiles(ProfileBook),
    StopSearch,
    /// Discard collected records and restart the search from setup.
    RetrySearch,
}
