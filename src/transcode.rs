//! Emoji image transcoding.
//!
//! Every emoji is downloaded as PNG, resized to a fixed square with
//! Lanczos3 and re-encoded as TGA, the format the client loads. A guild's
//! emoji are transcoded concurrently by a bounded worker pool; the first
//! failure aborts the remaining workers.

use std::sync::Arc;

use image::codecs::tga::TgaEncoder;
use image::imageops::FilterType;
use image::{ExtendedColorType, ImageEncoder, ImageFormat};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::error::{PackError, Result};
use crate::source::ImageFetcher;
use crate::types::Emote;

/// File extension of transcoded images.
pub const OUTPUT_EXTENSION: &str = "tga";

/// An emoji converted to the output format.
#[derive(Debug, Clone)]
pub struct TranscodedImage {
    pub emote: Emote,
    pub bytes: Vec<u8>,
}

/// Decode a PNG, resize it to `size`×`size` and encode it as TGA.
///
/// The aspect ratio is not preserved: non-square sources are stretched.
/// Output is uncompressed 32-bit true-colour; the client does not read RLE.
pub fn transcode_image(emote: &Emote, png: &[u8], size: u32) -> Result<Vec<u8>> {
    let source = image::load_from_memory_with_format(png, ImageFormat::Png).map_err(|e| {
        PackError::ImageDecodeFailed {
            emote: emote.name.clone(),
            message: e.to_string(),
        }
    })?;

    let rgba = source
        .resize_exact(size, size, FilterType::Lanczos3)
        .to_rgba8();

    let mut out = Vec::new();
    TgaEncoder::new(&mut out)
        .disable_rle()
        .write_image(rgba.as_raw(), size, size, ExtendedColorType::Rgba8)
        .map_err(|e| PackError::ImageEncodeFailed {
            emote: emote.name.clone(),
            message: e.to_string(),
        })?;

    Ok(out)
}

/// Fetch and transcode one emoji. Image work runs on the blocking pool.
pub async fn transcode_emote(
    fetcher: &dyn ImageFetcher,
    emote: &Emote,
    size: u32,
) -> Result<TranscodedImage> {
    let png = fetcher.fetch(emote).await?;

    let worker_emote = emote.clone();
    let bytes = tokio::task::spawn_blocking(move || transcode_image(&worker_emote, &png, size))
        .await
        .map_err(|e| PackError::ImageEncodeFailed {
            emote: emote.name.clone(),
            message: format!("transcode worker failed: {e}"),
        })??;

    debug!(emote = %emote.name, bytes = bytes.len(), "emote transcoded");
    Ok(TranscodedImage {
        emote: emote.clone(),
        bytes,
    })
}

/// Transcode every emote with at most `concurrency` in flight.
///
/// Results come back in input order. The first error aborts all other
/// tasks and is returned.
pub async fn transcode_all(
    fetcher: Arc<dyn ImageFetcher>,
    emotes: &[Emote],
    size: u32,
    concurrency: usize,
) -> Result<Vec<TranscodedImage>> {
    let sem = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut join_set: JoinSet<(usize, Result<TranscodedImage>)> = JoinSet::new();

    for (index, emote) in emotes.iter().cloned().enumerate() {
        let sem = sem.clone();
        let fetcher = fetcher.clone();

        join_set.spawn(async move {
            let result = match sem.acquire_owned().await {
                Ok(_permit) => transcode_emote(fetcher.as_ref(), &emote, size).await,
                Err(e) => Err(PackError::ImageFetchFailed {
                    emote: emote.name.clone(),
                    id: emote.id.clone(),
                    message: e.to_string(),
                }),
            };
            (index, result)
        });
    }

    let mut slots: Vec<Option<TranscodedImage>> = vec![None; emotes.len()];
    while let Some(joined) = join_set.join_next().await {
        let outcome = match joined {
            Ok((index, Ok(image))) => {
                slots[index] = Some(image);
                continue;
            }
            Ok((_, Err(e))) => e,
            Err(e) => PackError::ImageEncodeFailed {
                emote: "<worker>".to_string(),
                message: format!("transcode task failed: {e}"),
            },
        };

        warn!(error = %outcome, in_flight = join_set.len(), "transcode failed, cancelling");
        join_set.abort_all();
        return Err(outcome);
    }

    Ok(slots.into_iter().flatten().collect())
}
