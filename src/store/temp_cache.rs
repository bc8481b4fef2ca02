use std::path::{Path, PathBuf};

use crate::foundation::error::{GifbarError, GifbarResult};

/// Suffix appended to the source file name to form its sibling cache directory.
pub const TEMP_CACHE_SUFFIX: &str = ".frames";

/// Sibling scratch directory for one source's composited frames.
///
/// The name is derived from the source file name (`.<name>.frames`), so two pipelines working on
/// different files in the same directory never share a cache.
pub fn temp_cache_dir(source: &Path) -> PathBuf {
    let name = source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "source".to_owned());
    let parent = source.parent().unwrap_or_else(|| Path::new("."));
    parent.join(format!(".{name}{TEMP_CACHE_SUFFIX}"))
}

/// On-disk frame cache owned by a single pipeline run.
///
/// Holds one PNG per frame named by its frame index. The whole subtree is removed by
/// [`TempCache::dispose`], or on drop if the run ended early.
#[derive(Debug)]
pub struct TempCache {
    dir: PathBuf,
    disposed: bool,
}

impl TempCache {
    /// Create the cache directory, clearing anything left behind by an interrupted run.
    ///
    /// An existing path that does not look like a frame cache is left alone and reported as a
    /// [`GifbarError::Resource`].
    pub fn create(dir: impl Into<PathBuf>) -> GifbarResult<Self> {
        let dir = dir.into();
        if dir.exists() {
            if !is_frame_cache(&dir) {
                return Err(GifbarError::resource(format!(
                    "'{}' exists and is not a frame cache; refusing to clear it",
                    dir.display()
                )));
            }
            tracing::debug!(dir = %dir.display(), "removing stale temp cache");
            std::fs::remove_dir_all(&dir).map_err(|e| {
                GifbarError::resource(format!(
                    "failed to clear stale temp cache '{}': {e}",
                    dir.display()
                ))
            })?;
        }
        std::fs::create_dir_all(&dir).map_err(|e| {
            GifbarError::resource(format!(
                "failed to create temp cache '{}': {e}",
                dir.display()
            ))
        })?;
        Ok(Self {
            dir,
            disposed: false,
        })
    }

    /// Cache directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the PNG holding frame `index`.
    pub fn frame_path(&self, index: usize) -> PathBuf {
        self.dir.join(format!("{index}.png"))
    }

    /// Remove the cache directory and every frame file in it.
    pub fn dispose(mut self) -> GifbarResult<()> {
        self.disposed = true;
        remove_tree(&self.dir)
    }
}

impl Drop for TempCache {
    fn drop(&mut self) {
        if self.disposed {
            return;
        }
        if let Err(e) = remove_tree(&self.dir) {
            tracing::warn!(dir = %self.dir.display(), error = %e, "temp cache cleanup failed");
        }
    }
}

/// A leftover cache is a directory holding nothing but `<index>.png` files.
fn is_frame_cache(dir: &Path) -> bool {
    let Ok(mut entries) = std::fs::read_dir(dir) else {
        return false;
    };
    entries.all(|entry| {
        entry.is_ok_and(|e| {
            let name = e.file_name();
            let name = name.to_string_lossy();
            e.path().is_file()
                && name
                    .strip_suffix(".png")
                    .is_some_and(|stem| !stem.is_empty() && stem.bytes().all(|b| b.is_ascii_digit()))
        })
    })
}

fn remove_tree(dir: &Path) -> GifbarResult<()> {
    match std::fs::remove_dir_all(dir) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(GifbarError::resource(format!(
            "failed to remove temp cache '{}': {e}",
            dir.display()
        ))),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/store/temp_cache.rs"]
mod tests;
