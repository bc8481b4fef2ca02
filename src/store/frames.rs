use std::path::Path;

use anyhow::Context as _;
use image::RgbaImage;

use crate::{
    foundation::core::{Canvas, FrameDelay},
    foundation::error::{GifbarError, GifbarResult},
    store::temp_cache::TempCache,
};

/// Where composited frames live between decode and encode.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum StorageMode {
    /// Keep every frame as an in-memory RGBA buffer.
    #[default]
    Memory,
    /// Persist every frame as a PNG in a per-source temp cache.
    Disk,
}

enum Backing {
    Memory(Vec<RgbaImage>),
    Disk { cache: TempCache, len: usize },
}

/// Ordered frame list with uniform access regardless of backing.
///
/// Frame order is playback order. Handlers mutate frames in place through
/// [`FrameStore::update`] / [`FrameStore::update_all`]; the encoder reads them with
/// [`FrameStore::load`].
pub struct FrameStore {
    canvas: Canvas,
    delays: Vec<FrameDelay>,
    backing: Backing,
}

impl std::fmt::Debug for FrameStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameStore")
            .field("canvas", &self.canvas)
            .field("len", &self.len())
            .field("mode", &self.mode())
            .finish()
    }
}

impl FrameStore {
    /// Empty store keeping frames in memory.
    pub fn in_memory(canvas: Canvas) -> Self {
        Self {
            canvas,
            delays: Vec::new(),
            backing: Backing::Memory(Vec::new()),
        }
    }

    /// Empty store backed by a freshly created temp cache at `cache_dir`.
    pub fn on_disk(canvas: Canvas, cache_dir: &Path) -> GifbarResult<Self> {
        let cache = TempCache::create(cache_dir)?;
        Ok(Self {
            canvas,
            delays: Vec::new(),
            backing: Backing::Disk { cache, len: 0 },
        })
    }

    /// Canvas size captured at decode time.
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Backing kind.
    pub fn mode(&self) -> StorageMode {
        match self.backing {
            Backing::Memory(_) => StorageMode::Memory,
            Backing::Disk { .. } => StorageMode::Disk,
        }
    }

    /// Temp cache directory for disk-backed stores.
    pub fn cache_dir(&self) -> Option<&Path> {
        match &self.backing {
            Backing::Memory(_) => None,
            Backing::Disk { cache, .. } => Some(cache.dir()),
        }
    }

    /// Number of frames.
    pub fn len(&self) -> usize {
        self.delays.len()
    }

    /// Return `true` when no frame has been stored.
    pub fn is_empty(&self) -> bool {
        self.delays.is_empty()
    }

    /// Display delay of frame `index`.
    pub fn delay(&self, index: usize) -> Option<FrameDelay> {
        self.delays.get(index).copied()
    }

    /// Append a frame at the end of the sequence.
    pub fn push(&mut self, frame: RgbaImage, delay: FrameDelay) -> GifbarResult<()> {
        match &mut self.backing {
            Backing::Memory(frames) => frames.push(frame),
            Backing::Disk { cache, len } => {
                save_png(&frame, &cache.frame_path(*len))?;
                *len += 1;
            }
        }
        self.delays.push(delay);
        Ok(())
    }

    /// Current pixel dimensions of frame `index` (handlers may have resized it).
    pub fn dimensions(&self, index: usize) -> GifbarResult<(u32, u32)> {
        self.check_index(index)?;
        match &self.backing {
            Backing::Memory(frames) => Ok(frames[index].dimensions()),
            Backing::Disk { cache, .. } => {
                let path = cache.frame_path(index);
                let dims = image::image_dimensions(&path)
                    .with_context(|| format!("read frame header '{}'", path.display()))?;
                Ok(dims)
            }
        }
    }

    /// Owned copy of frame `index`.
    pub fn load(&self, index: usize) -> GifbarResult<RgbaImage> {
        self.check_index(index)?;
        match &self.backing {
            Backing::Memory(frames) => Ok(frames[index].clone()),
            Backing::Disk { cache, .. } => load_png(&cache.frame_path(index)),
        }
    }

    /// Mutate frame `index` in place. Disk frames are re-opened, mutated and re-saved.
    pub fn update<F>(&mut self, index: usize, f: F) -> GifbarResult<()>
    where
        F: FnOnce(&mut RgbaImage) -> GifbarResult<()>,
    {
        self.check_index(index)?;
        match &mut self.backing {
            Backing::Memory(frames) => f(&mut frames[index]),
            Backing::Disk { cache, .. } => {
                let path = cache.frame_path(index);
                let mut frame = load_png(&path)?;
                f(&mut frame)?;
                save_png(&frame, &path)
            }
        }
    }

    /// Mutate every frame in playback order. The closure receives the frame index.
    pub fn update_all<F>(&mut self, mut f: F) -> GifbarResult<()>
    where
        F: FnMut(usize, &mut RgbaImage) -> GifbarResult<()>,
    {
        for index in 0..self.len() {
            self.update(index, |frame| f(index, frame))?;
        }
        Ok(())
    }

    /// Release the backing storage, deleting the temp cache for disk-backed stores.
    pub fn dispose(self) -> GifbarResult<()> {
        match self.backing {
            Backing::Memory(_) => Ok(()),
            Backing::Disk { cache, .. } => cache.dispose(),
        }
    }

    fn check_index(&self, index: usize) -> GifbarResult<()> {
        if index >= self.len() {
            return Err(GifbarError::validation(format!(
                "frame index {index} out of range (len {})",
                self.len()
            )));
        }
        Ok(())
    }
}

fn save_png(frame: &RgbaImage, path: &Path) -> GifbarResult<()> {
    frame
        .save_with_format(path, image::ImageFormat::Png)
        .map_err(|e| {
            GifbarError::resource(format!("failed to write frame '{}': {e}", path.display()))
        })
}

fn load_png(path: &Path) -> GifbarResult<RgbaImage> {
    let img = image::open(path).with_context(|| format!("read frame '{}'", path.display()))?;
    Ok(img.into_rgba8())
}

#[cfg(test)]
#[path = "../../tests/unit/store/frames.rs"]
mod tests;
