use std::{
    ffi::OsString,
    fs::File,
    io::{BufWriter, Write as _},
    path::{Path, PathBuf},
};

use image::codecs::gif::{GifEncoder, Repeat};

use crate::{
    foundation::core::FrameDelay,
    foundation::error::{GifbarError, GifbarResult},
    store::frames::FrameStore,
};

/// Highest accepted quality; maps to the slowest, most accurate quantizer setting.
pub const MAX_QUALITY: u8 = 100;

/// Encoder settings shared by every file of a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EncodeSettings {
    /// Loop forever (`true`) or play once.
    pub loop_playback: bool,
    /// Quantizer quality, 1 (fastest) ..= 100 (best).
    pub quality: u8,
    /// Carry source frame delays over; otherwise every frame gets [`FrameDelay::FALLBACK`].
    pub preserve_delays: bool,
}

impl Default for EncodeSettings {
    fn default() -> Self {
        Self {
            loop_playback: true,
            quality: MAX_QUALITY,
            preserve_delays: true,
        }
    }
}

impl EncodeSettings {
    /// Check value ranges.
    pub fn validate(&self) -> GifbarResult<()> {
        if !(1..=MAX_QUALITY).contains(&self.quality) {
            return Err(GifbarError::validation(format!(
                "quality must be in 1..=100, got {}",
                self.quality
            )));
        }
        Ok(())
    }

    /// Quantizer speed (1 = best, 30 = fastest) for the configured quality.
    pub fn speed(&self) -> i32 {
        let q = i32::from(self.quality.clamp(1, MAX_QUALITY));
        1 + ((100 - q) * 29 + 49) / 99
    }
}

/// Summary of one encoded output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodeStats {
    /// Output file.
    pub path: PathBuf,
    /// Frames written.
    pub frames: usize,
    /// Output size in bytes.
    pub bytes: u64,
}

/// Reassembles a frame list into one animated GIF.
#[derive(Clone, Copy, Debug)]
pub struct AnimationEncoder {
    settings: EncodeSettings,
}

impl AnimationEncoder {
    /// Validated encoder.
    pub fn new(settings: EncodeSettings) -> GifbarResult<Self> {
        settings.validate()?;
        Ok(Self { settings })
    }

    /// Settings in use.
    pub fn settings(&self) -> EncodeSettings {
        self.settings
    }

    /// Encode `frames` to `out`, then release the store.
    ///
    /// Bytes go to a sibling `.part` file that is renamed over `out` only after a complete
    /// write, so a failure never leaves a truncated output behind.
    #[tracing::instrument(skip_all, fields(out = %out.display(), frames = frames.len()))]
    pub fn encode(&self, frames: FrameStore, out: &Path) -> GifbarResult<EncodeStats> {
        if frames.is_empty() {
            return Err(GifbarError::validation(
                "refusing to encode an empty frame list",
            ));
        }

        let part = part_path(out);
        if let Err(e) = self.write_frames(&frames, &part) {
            remove_part(&part);
            return Err(e);
        }
        if let Err(e) = std::fs::rename(&part, out) {
            remove_part(&part);
            return Err(GifbarError::resource(format!(
                "failed to move '{}' into place: {e}",
                out.display()
            )));
        }

        let stats = EncodeStats {
            path: out.to_path_buf(),
            frames: frames.len(),
            bytes: std::fs::metadata(out).map(|m| m.len()).unwrap_or(0),
        };
        if let Err(e) = frames.dispose() {
            tracing::warn!(error = %e, "output written but frame storage cleanup failed");
        }
        tracing::debug!(bytes = stats.bytes, "encoded");
        Ok(stats)
    }

    fn write_frames(&self, frames: &FrameStore, part: &Path) -> GifbarResult<()> {
        let file = File::create(part).map_err(|e| {
            GifbarError::resource(format!("failed to create '{}': {e}", part.display()))
        })?;
        let mut writer = BufWriter::new(file);

        {
            let mut encoder = GifEncoder::new_with_speed(&mut writer, self.settings.speed());
            if self.settings.loop_playback {
                encoder
                    .set_repeat(Repeat::Infinite)
                    .map_err(|e| GifbarError::encode(format!("set loop policy: {e}")))?;
            }

            for index in 0..frames.len() {
                let pixels = frames.load(index)?;
                let delay = match (self.settings.preserve_delays, frames.delay(index)) {
                    (true, Some(d)) => d,
                    _ => FrameDelay::FALLBACK,
                };
                let frame = image::Frame::from_parts(
                    pixels,
                    0,
                    0,
                    image::Delay::from_numer_denom_ms(delay.as_millis(), 1),
                );
                encoder
                    .encode_frame(frame)
                    .map_err(|e| GifbarError::encode(format!("frame {index}: {e}")))?;
            }
        }

        writer.flush().map_err(|e| {
            GifbarError::resource(format!("failed to write '{}': {e}", part.display()))
        })
    }
}

/// Sibling path the encoder writes to before renaming into place.
pub fn part_path(out: &Path) -> PathBuf {
    let mut name = out
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("output"));
    name.push(".part");
    out.with_file_name(name)
}

fn remove_part(part: &Path) {
    if let Err(e) = std::fs::remove_file(part)
        && e.kind() != std::io::ErrorKind::NotFound
    {
        tracing::warn!(path = %part.display(), error = %e, "failed to remove partial output");
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/gif.rs"]
mod tests;
