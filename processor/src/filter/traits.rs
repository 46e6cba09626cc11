use snaplab_common::frame::PixelBuffer;

/// A full-frame pixel transform.
///
/// Implementations read an immutable source buffer and return a freshly
/// allocated buffer of identical dimensions. Alpha is carried through
/// unchanged.
pub trait PixelFilter: Send + Sync {
    fn apply(&self, source: &PixelBuffer) -> PixelBuffer;

    /// Human-readable name for logging.
    fn name(&self) -> &str {
        "unnamed"
    }
}
