//! Mood to sound mapping.

use crate::CatalogError;
use moodbox_mood::Mood;
use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};
use tracing::warn;

/// Resolves a relative sound reference against `root`.
///
/// The reference must be non-empty and relative, must not contain `..` or
/// `\`, and must name an existing file inside `root` after symlinks are
/// resolved.
pub fn safe_sound_path(root: &Path, reference: &str) -> Result<PathBuf, CatalogError> {
    if reference.is_empty() {
        return Err(CatalogError::EmptyPath);
    }
    if reference.contains("..") || reference.contains('\\') {
        return Err(CatalogError::Traversal(reference.to_string()));
    }
    let rel = Path::new(reference);
    if rel.is_absolute() || rel.components().any(|c| matches!(c, Component::Prefix(_))) {
        return Err(CatalogError::Absolute(reference.to_string()));
    }

    let base = root.canonicalize().map_err(|source| CatalogError::Root {
        path: root.to_path_buf(),
        source,
    })?;
    let joined = base.join(rel);
    let target = joined
        .canonicalize()
        .map_err(|_| CatalogError::NotFound(joined.clone()))?;
    if !target.starts_with(&base) {
        return Err(CatalogError::OutsideRoot(target));
    }
    if !target.is_file() {
        return Err(CatalogError::NotFound(target));
    }
    Ok(target)
}

/// Validated sound files per mood.
#[derive(Debug, Clone, Default)]
pub struct SoundCatalog {
    root: PathBuf,
    sounds: BTreeMap<Mood, Vec<PathBuf>>,
}

impl SoundCatalog {
    /// Creates an empty catalog rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            sounds: BTreeMap::new(),
        }
    }

    /// Builds a catalog from relative references. Invalid references are
    /// logged and skipped.
    pub fn load<'a, I, S>(root: impl Into<PathBuf>, entries: I) -> Self
    where
        I: IntoIterator<Item = (Mood, &'a [S])>,
        S: AsRef<str> + 'a,
    {
        let mut catalog = Self::new(root);
        for (mood, refs) in entries {
            for reference in refs {
                let reference = reference.as_ref();
                if let Err(e) = catalog.insert(mood, reference) {
                    warn!(%mood, sound = reference, error = %e, "skipping sound");
                }
            }
        }
        catalog
    }

    /// Validates a reference and appends it to `mood`'s list.
    pub fn insert(&mut self, mood: Mood, reference: &str) -> Result<&Path, CatalogError> {
        let path = safe_sound_path(&self.root, reference)?;
        let list = self.sounds.entry(mood).or_default();
        list.push(path);
        Ok(list[list.len() - 1].as_path())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn has_sounds(&self, mood: Mood) -> bool {
        self.sounds.get(&mood).is_some_and(|l| !l.is_empty())
    }

    pub fn sounds(&self, mood: Mood) -> &[PathBuf] {
        self.sounds.get(&mood).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Moods with at least one sound.
    pub fn moods(&self) -> impl Iterator<Item = Mood> + '_ {
        self.sounds
            .iter()
            .filter(|(_, l)| !l.is_empty())
            .map(|(m, _)| *m)
    }

    /// Picks one of `mood`'s sounds uniformly at random.
    pub fn pick<R: Rng + ?Sized>(&self, mood: Mood, rng: &mut R) -> Option<&Path> {
        self.sounds
            .get(&mood)
            .and_then(|l| l.choose(rng))
            .map(PathBuf::as_path)
    }

    /// [`pick`](Self::pick) with the thread-local generator.
    pub fn pick_random(&self, mood: Mood) -> Option<&Path> {
        self.pick(mood, &mut rand::thread_rng())
    }
}
