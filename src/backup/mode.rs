//! Archive mode selection policy

use std::path::PathBuf;

use crate::classify::PathKind;

/// How a run packages its sources
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveMode {
    /// One archive per source
    Individual,
    /// One combined archive holding every source
    Combined,
}

/// Pick an archive mode for a set of classified sources
///
/// Small batches get individual archives; larger all-of-a-kind batches are
/// combined into one. Mixed file/directory batches always stay individual
/// so each source keeps a predictable archive layout.
pub fn choose_mode(sources: &[(PathBuf, PathKind)]) -> ArchiveMode {
    let mixed = sources.windows(2).any(|pair| pair[0].1 != pair[1].1);
    if mixed || sources.len() <= 3 {
        ArchiveMode::Individual
    } else {
        ArchiveMode::Combined
    }
}
