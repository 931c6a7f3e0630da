//! Archive entry sources
//!
//! A landscape is assembled from named entries (`m05050.hei`, `m05050.dat`,
//! ...) pulled out of land and maps archives. [`EntrySource`] is the only
//! thing the assembler needs from an archive: a lookup by entry name.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Named-entry lookup over an unpacked archive
///
/// Implementations must be shareable across threads so sectors can be
/// assembled in parallel.
pub trait EntrySource: Send + Sync {
    /// Raw bytes of entry `name`, or `None` if the archive lacks it
    fn entry(&self, name: &str) -> Option<&[u8]>;

    /// Whether the archive holds entry `name`
    fn contains(&self, name: &str) -> bool {
        self.entry(name).is_some()
    }
}

impl EntrySource for HashMap<String, Vec<u8>> {
    fn entry(&self, name: &str) -> Option<&[u8]> {
        self.get(name).map(Vec::as_slice)
    }
}

impl EntrySource for BTreeMap<String, Vec<u8>> {
    fn entry(&self, name: &str) -> Option<&[u8]> {
        self.get(name).map(Vec::as_slice)
    }
}

impl<T: EntrySource + ?Sized> EntrySource for Box<T> {
    fn entry(&self, name: &str) -> Option<&[u8]> {
        (**self).entry(name)
    }
}

impl<T: EntrySource + ?Sized> EntrySource for Arc<T> {
    fn entry(&self, name: &str) -> Option<&[u8]> {
        (**self).entry(name)
    }
}

/// Record layout carried by a set of sources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceFormat {
    /// `.hei` in the land archive, `.dat` and `.loc` in the maps archive
    Classic,
    /// One `.jm` record per sector in the maps archive
    Jm,
}

/// One registered archive pair
pub(crate) struct ArchiveSource {
    pub(crate) land: Option<Box<dyn EntrySource>>,
    pub(crate) maps: Box<dyn EntrySource>,
    pub(crate) members: bool,
}

impl std::fmt::Debug for ArchiveSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArchiveSource")
            .field("land", &self.land.is_some())
            .field("members", &self.members)
            .finish_non_exhaustive()
    }
}
