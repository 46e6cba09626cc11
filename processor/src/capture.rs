use chrono::Utc;
use image::imageops::FilterType;
use image::ImageReader;
use snaplab_common::config::CaptureConfig;
use snaplab_common::frame::{CapturedFrame, FrameError, PixelBuffer};
use std::io::Cursor;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("failed to read image file {0}: {1}")]
    ReadFile(String, std::io::Error),
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("HTTP status {0}")]
    HttpStatus(u16),
    #[error("failed to decode image: {0}")]
    Decode(String),
    #[error("frame error: {0}")]
    Frame(#[from] FrameError),
    #[error("capture misconfigured: {0}")]
    Config(String),
}

/// Where still frames come from.
#[derive(Debug, Clone)]
pub enum CaptureSource {
    /// An image file on disk, re-read on every capture.
    File(PathBuf),
    /// A camera snapshot endpoint returning one encoded image per GET.
    Http { url: String, client: reqwest::Client },
}

/// Grabs single frames and normalizes them to the session size.
#[derive(Debug)]
pub struct Camera {
    source: CaptureSource,
    width: u32,
    height: u32,
    seq: AtomicU64,
}

impl Camera {
    pub fn new(source: CaptureSource, width: u32, height: u32) -> Self {
        Self {
            source,
            width,
            height,
            seq: AtomicU64::new(0),
        }
    }

    pub fn from_config(config: &CaptureConfig) -> Result<Self, CaptureError> {
        let source = match config.source.as_str() {
            "file" => {
                let path = config
                    .path
                    .as_ref()
                    .ok_or_else(|| CaptureError::Config("file source needs `path`".into()))?;
                CaptureSource::File(PathBuf::from(path))
            }
            "http" => {
                let url = config
                    .url
                    .clone()
                    .ok_or_else(|| CaptureError::Config("http source needs `url`".into()))?;
                let client = reqwest::Client::builder()
                    .connect_timeout(Duration::from_secs(config.timeout_secs))
                    .timeout(Duration::from_secs(config.timeout_secs))
                    .build()?;
                CaptureSource::Http { url, client }
            }
            other => {
                return Err(CaptureError::Config(format!(
                    "unknown capture source '{other}'"
                )))
            }
        };
        Ok(Self::new(source, config.width, config.height))
    }

    /// Fetch one frame. Each successful capture gets the next sequence
    /// number, so a newer frame always compares greater than an older one.
    pub async fn capture(&self) -> Result<CapturedFrame, CaptureError> {
        let encoded = match &self.source {
            CaptureSource::File(path) => tokio::fs::read(path)
                .await
                .map_err(|e| CaptureError::ReadFile(path.display().to_string(), e))?,
            CaptureSource::Http { url, client } => {
                let resp = client.get(url).send().await?;
                if !resp.status().is_success() {
                    return Err(CaptureError::HttpStatus(resp.status().as_u16()));
                }
                resp.bytes().await?.to_vec()
            }
        };

        let buffer = decode_frame(&encoded, self.width, self.height)?;
        let seq = self.seq.fetch_add(1, Ordering::Relaxed) + 1;
        let now_ms = Utc::now().timestamp_millis();
        info!(
            seq,
            bytes = encoded.len(),
            width = self.width,
            height = self.height,
            "captured frame"
        );
        Ok(CapturedFrame::new(buffer, now_ms, seq))
    }
}

/// Decode an encoded image (format guessed from its bytes), scale it to
/// exactly `width` x `height` and convert it to RGBA.
pub fn decode_frame(encoded: &[u8], width: u32, height: u32) -> Result<PixelBuffer, CaptureError> {
    let img = ImageReader::new(Cursor::new(encoded))
        .with_guessed_format()
        .map_err(|e| CaptureError::Decode(e.to_string()))?
        .decode()
        .map_err(|e| CaptureError::Decode(e.to_string()))?;

    debug!(
        src_width = img.width(),
        src_height = img.height(),
        width,
        height,
        "decoded capture"
    );

    let rgba = if img.width() == width && img.height() == height {
        img.to_rgba8()
    } else {
        img.resize_exact(width, height, FilterType::Nearest).to_rgba8()
    };
    Ok(PixelBuffer::from_raw(width, height, rgba.into_raw())?)
}
