use std::future::Future;

use snaplab_common::config::DetectorConfig;
use snaplab_common::frame::{Detection, PixelBuffer, Region};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DetectorError {
    #[error("detection model not ready")]
    NotReady,
    #[error("detection failed: {0}")]
    Failed(String),
}

/// Finds axis-aligned regions of interest (faces) in a frame.
///
/// Implementations return regions in their own output order with the
/// confidence filter already applied. The region slot renders them in that
/// order, so later regions overwrite earlier ones where they overlap.
pub trait RegionDetector: Send + Sync {
    fn detect(
        &self,
        frame: &PixelBuffer,
    ) -> impl Future<Output = Result<Vec<Region>, DetectorError>> + Send;

    fn name(&self) -> &str {
        "unnamed"
    }
}

/// Keep detections at or above `min_confidence`, in order.
pub fn filter_confident(detections: &[Detection], min_confidence: f32) -> Vec<Region> {
    detections
        .iter()
        .filter(|d| d.confidence >= min_confidence)
        .map(|d| d.region)
        .collect()
}

/// Detector that reports a fixed set of detections from the config file.
///
/// Stands in for a real face model: it can be marked not ready, and it
/// applies the same confidence filter a model-backed detector would.
#[derive(Debug, Clone)]
pub struct ConfiguredDetector {
    detections: Vec<Detection>,
    min_confidence: f32,
    ready: bool,
}

impl ConfiguredDetector {
    pub fn new(detections: Vec<Detection>, min_confidence: f32, ready: bool) -> Self {
        Self {
            detections,
            min_confidence,
            ready,
        }
    }

    pub fn from_config(config: &DetectorConfig) -> Self {
        let detections = config
            .regions
            .iter()
            .map(|r| Detection {
                region: Region::new(r.x, r.y, r.width, r.height),
                confidence: r.confidence,
            })
            .collect();
        Self::new(detections, config.min_confidence, config.ready)
    }
}

impl RegionDetector for ConfiguredDetector {
    async fn detect(&self, frame: &PixelBuffer) -> Result<Vec<Region>, DetectorError> {
        if !self.ready {
            return Err(DetectorError::NotReady);
        }
        let regions = filter_confident(&self.detections, self.min_confidence);
        debug!(
            width = frame.width(),
            height = frame.height(),
            candidates = self.detections.len(),
            kept = regions.len(),
            "configured detector ran"
        );
        Ok(regions)
    }

    fn name(&self) -> &str {
        "configured"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use snaplab_common::config::RegionConfig;

    fn det(x: f64, confidence: f32) -> Detection {
        Detection {
            region: Region::new(x, 0.0, 10.0, 10.0),
            confidence,
        }
    }

    #[test]
    fn confidence_filter_keeps_order() {
        let kept = filter_confident(&[det(1.0, 0.9), det(2.0, 0.2), det(3.0, 0.5)], 0.5);
        assert_eq!(kept.iter().map(|r| r.x).collect::<Vec<_>>(), vec![1.0, 3.0]);
    }

    #[tokio::test]
    async fn not_ready_detector_reports_not_ready() {
        let detector = ConfiguredDetector::new(vec![det(0.0, 1.0)], 0.5, false);
        let frame = PixelBuffer::new(4, 4);
        assert_eq!(detector.detect(&frame).await, Err(DetectorError::NotReady));
    }

    #[tokio::test]
    async fn from_config_applies_min_confidence() {
        let config = DetectorConfig {
            min_confidence: 0.6,
            ready: true,
            regions: vec![
                RegionConfig {
                    x: 5.0,
                    y: 5.0,
                    width: 20.0,
                    height: 20.0,
                    confidence: 0.55,
                },
                RegionConfig {
                    x: 40.0,
                    y: 10.0,
                    width: 30.0,
                    height: 30.0,
                    confidence: 0.95,
                },
            ],
        };
        let detector = ConfiguredDetector::from_config(&config);
        let regions = detector.detect(&PixelBuffer::new(160, 120)).await.unwrap();
        assert_eq!(regions, vec![Region::new(40.0, 10.0, 30.0, 30.0)]);
        assert_eq!(detector.name(), "configured");
    }
}
