use formats::geojson::FeatureCollection;
use serde::{Deserialize, Serialize};

use crate::selection::FeatureSelection;

/// One zoom tier: at `zoom >= min_zoom` every `stride`-th point is drawn.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct LodTier {
    pub min_zoom: f64,
    pub stride: usize,
}

impl LodTier {
    pub const fn new(min_zoom: f64, stride: usize) -> Self {
        Self { min_zoom, stride }
    }
}

/// Zoom-keyed decimation policy for dense point layers.
///
/// Below the lowest tier's `min_zoom` the layer is suppressed entirely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "LodConfigDef", into = "LodConfigDef")]
pub struct LodConfig {
    tiers: Vec<LodTier>,
}

/// Serialized form; validated through [`LodConfig::new`] on the way in.
#[derive(Serialize, Deserialize)]
struct LodConfigDef {
    tiers: Vec<LodTier>,
}

impl TryFrom<LodConfigDef> for LodConfig {
    type Error = LodConfigError;

    fn try_from(def: LodConfigDef) -> Result<Self, Self::Error> {
        LodConfig::new(def.tiers)
    }
}

impl From<LodConfig> for LodConfigDef {
    fn from(config: LodConfig) -> Self {
        Self { tiers: config.tiers }
    }
}

impl Default for LodConfig {
    fn default() -> Self {
        Self {
            tiers: vec![
                LodTier::new(14.0, 1),
                LodTier::new(13.0, 2),
                LodTier::new(12.0, 4),
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LodConfigError {
    NoTiers,
    ZeroStride { min_zoom: f64 },
    NonFiniteZoom,
    DuplicateZoom { min_zoom: f64 },
    /// A higher-zoom tier would show fewer points than a lower one.
    StrideIncreasesWithZoom { min_zoom: f64 },
}

impl std::fmt::Display for LodConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LodConfigError::NoTiers => write!(f, "LOD config needs at least one tier"),
            LodConfigError::ZeroStride { min_zoom } => {
                write!(f, "tier at zoom {min_zoom} has stride 0")
            }
            LodConfigError::NonFiniteZoom => write!(f, "tier zoom must be finite"),
            LodConfigError::DuplicateZoom { min_zoom } => {
                write!(f, "more than one tier starts at zoom {min_zoom}")
            }
            LodConfigError::StrideIncreasesWithZoom { min_zoom } => {
                write!(f, "tier at zoom {min_zoom} has a larger stride than a lower tier")
            }
        }
    }
}

impl std::error::Error for LodConfigError {}

impl LodConfig {
    /// Validates and normalises tier order (highest `min_zoom` first).
    pub fn new(mut tiers: Vec<LodTier>) -> Result<Self, LodConfigError> {
        if tiers.is_empty() {
            return Err(LodConfigError::NoTiers);
        }
        for t in &tiers {
            if !t.min_zoom.is_finite() {
                return Err(LodConfigError::NonFiniteZoom);
            }
            if t.stride == 0 {
                return Err(LodConfigError::ZeroStride { min_zoom: t.min_zoom });
            }
        }
        tiers.sort_by(|a, b| b.min_zoom.total_cmp(&a.min_zoom));
        for pair in tiers.windows(2) {
            let (higher, lower) = (pair[0], pair[1]);
            if higher.min_zoom == lower.min_zoom {
                return Err(LodConfigError::DuplicateZoom { min_zoom: higher.min_zoom });
            }
            if higher.stride > lower.stride {
                return Err(LodConfigError::StrideIncreasesWithZoom { min_zoom: higher.min_zoom });
            }
        }
        Ok(Self { tiers })
    }

    /// Tiers, highest `min_zoom` first.
    pub fn tiers(&self) -> &[LodTier] {
        &self.tiers
    }

    pub fn validate(&self) -> Result<(), LodConfigError> {
        Self::new(self.tiers.clone()).map(|_| ())
    }

    /// Zoom below which the point layer is suppressed.
    pub fn suppression_zoom(&self) -> f64 {
        self.tiers
            .iter()
            .map(|t| t.min_zoom)
            .fold(f64::INFINITY, f64::min)
    }

    /// Stride for `zoom`, or `None` when the layer is suppressed.
    pub fn stride_for(&self, zoom: f64) -> Option<usize> {
        if !zoom.is_finite() {
            return None;
        }
        // Tier with the highest `min_zoom` not above `zoom`; independent of
        // the order tiers were deserialized in.
        self.tiers
            .iter()
            .filter(|t| zoom >= t.min_zoom)
            .max_by(|a, b| a.min_zoom.total_cmp(&b.min_zoom))
            .map(|t| t.stride)
    }

    /// Indices kept at `zoom` out of `len` points: every index with
    /// `index % stride == 0`. Deterministic in `(len, zoom tier)`.
    pub fn sample_indices(&self, len: usize, zoom: f64) -> Vec<u32> {
        match self.stride_for(zoom) {
            None => Vec::new(),
            Some(stride) => (0..len).step_by(stride).map(|i| i as u32).collect(),
        }
    }

    /// Selection form of [`Self::sample_indices`]; full density avoids an index list.
    pub fn sample_selection(&self, len: usize, zoom: f64) -> FeatureSelection {
        match self.stride_for(zoom) {
            Some(1) => FeatureSelection::All,
            _ => FeatureSelection::from_sorted(self.sample_indices(len, zoom)),
        }
    }

    /// Owned decimated copy of `points`.
    pub fn sample(&self, points: &FeatureCollection, zoom: f64) -> FeatureCollection {
        self.sample_indices(points.len(), zoom)
            .into_iter()
            .filter_map(|i| points.get(i as usize).cloned())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{LodConfig, LodConfigError, LodTier};
    use crate::selection::FeatureSelection;
    use formats::geojson::{FeatureCollection, GeoFeature, Geometry};
    use foundation::geo::LonLat;
    use serde_json::Map;

    fn points(n: usize) -> FeatureCollection {
        (0..n)
            .map(|i| {
                let mut f = GeoFeature::new(
                    Geometry::Point(LonLat::new(-73.6 + i as f64 * 1e-4, 45.5)),
                    Map::new(),
                );
                f.id = Some(format!("tree-{i}"));
                f
            })
            .collect()
    }

    #[test]
    fn default_tiers() {
        let lod = LodConfig::default();
        assert_eq!(lod.stride_for(16.0), Some(1));
        assert_eq!(lod.stride_for(14.0), Some(1));
        assert_eq!(lod.stride_for(13.5), Some(2));
        assert_eq!(lod.stride_for(12.0), Some(4));
        assert_eq!(lod.stride_for(11.99), None);
        assert_eq!(lod.stride_for(f64::NAN), None);
        assert_eq!(lod.suppression_zoom(), 12.0);
    }

    #[test]
    fn exact_membership_per_tier() {
        let lod = LodConfig::default();
        assert_eq!(lod.sample_indices(10, 12.5), vec![0, 4, 8]);
        assert_eq!(lod.sample_indices(10, 13.0), vec![0, 2, 4, 6, 8]);
        assert_eq!(lod.sample_indices(3, 15.0), vec![0, 1, 2]);
        assert!(lod.sample_indices(10, 11.0).is_empty());

        let sampled = lod.sample(&points(10), 12.5);
        let ids: Vec<_> = sampled.iter().filter_map(|f| f.id.clone()).collect();
        assert_eq!(ids, vec!["tree-0", "tree-4", "tree-8"]);
    }

    #[test]
    fn count_never_decreases_with_zoom() {
        let lod = LodConfig::default();
        let mut prev = 0;
        let mut zoom = 0.0;
        while zoom <= 20.0 {
            let n = lod.sample_indices(1_001, zoom).len();
            assert!(n >= prev, "zoom {zoom}: {n} < {prev}");
            prev = n;
            zoom += 0.25;
        }
        assert_eq!(prev, 1_001);
    }

    #[test]
    fn repeated_sampling_is_stable() {
        let lod = LodConfig::default();
        let pts = points(257);
        assert_eq!(lod.sample(&pts, 13.2), lod.sample(&pts, 13.7));
        assert_eq!(lod.sample_selection(257, 14.0), FeatureSelection::All);
    }

    #[test]
    fn rejects_non_monotone_tiers() {
        assert_eq!(LodConfig::new(vec![]).unwrap_err(), LodConfigError::NoTiers);
        assert_eq!(
            LodConfig::new(vec![LodTier::new(12.0, 0)]).unwrap_err(),
            LodConfigError::ZeroStride { min_zoom: 12.0 }
        );
        assert_eq!(
            LodConfig::new(vec![LodTier::new(12.0, 1), LodTier::new(14.0, 4)]).unwrap_err(),
            LodConfigError::StrideIncreasesWithZoom { min_zoom: 14.0 }
        );
        let cfg = LodConfig::new(vec![LodTier::new(10.0, 8), LodTier::new(15.0, 1)]).expect("valid");
        assert_eq!(cfg.tiers()[0].min_zoom, 15.0);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn deserialization_validates() {
        let zero = serde_json::from_str::<LodConfig>(r#"{"tiers":[{"min_zoom":12,"stride":0}]}"#);
        assert!(zero.is_err());
        let empty = serde_json::from_str::<LodConfig>(r#"{"tiers":[]}"#);
        assert!(empty.is_err());

        let cfg: LodConfig = serde_json::from_str(
            r#"{"tiers":[{"min_zoom":10,"stride":8},{"min_zoom":15,"stride":1}]}"#,
        )
        .expect("valid tiers");
        assert_eq!(cfg.tiers()[0], LodTier::new(15.0, 1));
        assert_eq!(cfg.sample_indices(20, 11.0), vec![0, 8, 16]);
    }
}
