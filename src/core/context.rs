//! Accumulated state of one reformat run.
//!
//! Each pipeline stage takes the context explicitly and adds what it
//! discovered; later stages only read what earlier ones recorded.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::core::family::{Family, CORE_FAMILY};
use crate::core::folder::{AppFolder, MocHeader, ObjectFolder};

#[derive(Debug, Clone, Default)]
pub struct ReformatContext {
    families: BTreeSet<String>,
    objects: Vec<ObjectFolder>,
    apps: Vec<AppFolder>,
    moc_headers: Vec<MocHeader>,
    headers: Vec<String>,
}

impl ReformatContext {
    /// Start a run with the families found by the descriptor scan.
    ///
    /// A scanned family named like Core is folded into Core.
    pub fn new(mut families: BTreeSet<String>) -> Self {
        if families.remove(CORE_FAMILY) {
            tracing::debug!("{} descriptors merge into the Core library", CORE_FAMILY);
        }
        ReformatContext {
            families,
            ..Default::default()
        }
    }

    /// Every destination family: the discovered plugins followed by Core.
    pub fn families(&self) -> Vec<Family> {
        self.families
            .iter()
            .cloned()
            .map(Family::Plugin)
            .chain(std::iter::once(Family::Core))
            .collect()
    }

    pub fn record_object(&mut self, folder: ObjectFolder) {
        self.objects.push(folder);
    }

    pub fn record_app(&mut self, app: AppFolder) {
        self.apps.push(app);
    }

    pub fn record_moc(&mut self, moc: MocHeader) {
        self.moc_headers.push(moc);
    }

    /// Remember a header that made it into the flat include directory.
    pub fn record_header(&mut self, name: impl Into<String>) {
        self.headers.push(name.into());
    }

    pub fn objects(&self) -> &[ObjectFolder] {
        &self.objects
    }

    pub fn apps(&self) -> &[AppFolder] {
        &self.apps
    }

    pub fn moc_headers(&self) -> &[MocHeader] {
        &self.moc_headers
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Generated meta-object sources belonging to `dir`, relative to it.
    ///
    /// `dir` is relative to the output root, e.g. `src/Core` or `apps`.
    pub fn moc_sources_under(&self, dir: &Path) -> Vec<PathBuf> {
        self.moc_headers
            .iter()
            .filter_map(|moc| moc.generated_source(dir))
            .collect()
    }
}
