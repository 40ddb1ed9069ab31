use std::borrow::Cow;

use foundation::color::{Rgba, lerp_channel};
use serde::{Deserialize, Serialize};

/// Lower and upper bound of the City Stress Index.
pub const CSI_MIN: f64 = 0.0;
pub const CSI_MAX: f64 = 100.0;

/// Alpha applied to every CSI fill colour.
pub const CSI_ALPHA: u8 = 180;

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Breakpoint {
    pub value: f64,
    pub rgb: [u8; 3],
}

impl Breakpoint {
    pub const fn new(value: f64, rgb: [u8; 3]) -> Self {
        Self { value, rgb }
    }
}

/// Stress colour ramp: muted greens through yellow and orange into dark red.
pub const CSI_BREAKPOINTS: [Breakpoint; 8] = [
    Breakpoint::new(0.0, [50, 120, 50]),
    Breakpoint::new(20.0, [100, 180, 100]),
    Breakpoint::new(40.0, [220, 200, 70]),
    Breakpoint::new(60.0, [255, 140, 0]),
    Breakpoint::new(70.0, [255, 50, 0]),
    Breakpoint::new(80.0, [220, 0, 0]),
    Breakpoint::new(90.0, [180, 0, 0]),
    Breakpoint::new(100.0, [180, 0, 0]),
];

#[derive(Debug, Clone, PartialEq)]
pub enum ColorScaleError {
    TooFewBreakpoints,
    FirstNotZero { value: f64 },
    LastBelowMax { value: f64 },
    NotIncreasing { index: usize },
}

impl std::fmt::Display for ColorScaleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColorScaleError::TooFewBreakpoints => write!(f, "colour scale needs at least two breakpoints"),
            ColorScaleError::FirstNotZero { value } => {
                write!(f, "first breakpoint must be at {CSI_MIN}, got {value}")
            }
            ColorScaleError::LastBelowMax { value } => {
                write!(f, "last breakpoint must be >= {CSI_MAX}, got {value}")
            }
            ColorScaleError::NotIncreasing { index } => {
                write!(f, "breakpoint {index} is not strictly greater than its predecessor")
            }
        }
    }
}

impl std::error::Error for ColorScaleError {}

/// Piecewise-linear mapping from a CSI value to an RGBA fill.
///
/// Contract:
/// - Inputs are clamped to `[0, 100]`; NaN reads as 0.
/// - A value equal to a breakpoint yields exactly that breakpoint's colour.
/// - Between breakpoints, each channel is interpolated from the two
///   bracketing breakpoints only and rounded to the nearest integer.
/// - Beyond the last breakpoint the last colour is returned (no extrapolation).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ColorScaleDef", into = "ColorScaleDef")]
pub struct ColorScale {
    breakpoints: Cow<'static, [Breakpoint]>,
    alpha: u8,
}

/// Serialized form; validated through [`ColorScale::new`] on the way in.
#[derive(Serialize, Deserialize)]
struct ColorScaleDef {
    breakpoints: Vec<Breakpoint>,
    alpha: u8,
}

impl TryFrom<ColorScaleDef> for ColorScale {
    type Error = ColorScaleError;

    fn try_from(def: ColorScaleDef) -> Result<Self, Self::Error> {
        ColorScale::new(def.breakpoints, def.alpha)
    }
}

impl From<ColorScale> for ColorScaleDef {
    fn from(scale: ColorScale) -> Self {
        Self {
            breakpoints: scale.breakpoints.into_owned(),
            alpha: scale.alpha,
        }
    }
}

impl Default for ColorScale {
    fn default() -> Self {
        Self::csi()
    }
}

impl ColorScale {
    /// The fixed stress-band scale used by the CSI grid layer.
    pub fn csi() -> Self {
        Self {
            breakpoints: Cow::Borrowed(&CSI_BREAKPOINTS),
            alpha: CSI_ALPHA,
        }
    }

    pub fn new(breakpoints: Vec<Breakpoint>, alpha: u8) -> Result<Self, ColorScaleError> {
        if breakpoints.len() < 2 {
            return Err(ColorScaleError::TooFewBreakpoints);
        }
        let first = breakpoints[0].value;
        if first != CSI_MIN {
            return Err(ColorScaleError::FirstNotZero { value: first });
        }
        for (index, pair) in breakpoints.windows(2).enumerate() {
            if pair[1].value.is_nan() || pair[1].value <= pair[0].value {
                return Err(ColorScaleError::NotIncreasing { index: index + 1 });
            }
        }
        let last = breakpoints[breakpoints.len() - 1].value;
        if last < CSI_MAX {
            return Err(ColorScaleError::LastBelowMax { value: last });
        }
        Ok(Self {
            breakpoints: Cow::Owned(breakpoints),
            alpha,
        })
    }

    pub fn breakpoints(&self) -> &[Breakpoint] {
        &self.breakpoints
    }

    pub fn alpha(&self) -> u8 {
        self.alpha
    }

    pub fn color_for(&self, value: f64) -> Rgba {
        let v = if value.is_nan() {
            CSI_MIN
        } else {
            value.clamp(CSI_MIN, CSI_MAX)
        };

        let bps = &self.breakpoints;
        // First breakpoint strictly above `v`; bps[0] is at 0 so this is >= 1.
        let upper = bps.partition_point(|bp| bp.value <= v);
        if upper >= bps.len() {
            return Rgba::rgb(bps[bps.len() - 1].rgb, self.alpha);
        }

        let lo = bps[upper - 1];
        let hi = bps[upper];
        let t = (v - lo.value) / (hi.value - lo.value);
        Rgba::new(
            lerp_channel(lo.rgb[0], hi.rgb[0], t),
            lerp_channel(lo.rgb[1], hi.rgb[1], t),
            lerp_channel(lo.rgb[2], hi.rgb[2], t),
            self.alpha,
        )
    }
}

/// Legend bands of the stress index.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StressBand {
    Low,
    ModerateLow,
    Moderate,
    High,
    Critical,
}

impl StressBand {
    pub fn of(value: f64) -> Self {
        let v = if value.is_nan() { CSI_MIN } else { value };
        if v < 20.0 {
            StressBand::Low
        } else if v < 40.0 {
            StressBand::ModerateLow
        } else if v < 60.0 {
            StressBand::Moderate
        } else if v < 80.0 {
            StressBand::High
        } else {
            StressBand::Critical
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StressBand::Low => "Low stress",
            StressBand::ModerateLow => "Moderate-low",
            StressBand::Moderate => "Moderate",
            StressBand::High => "High",
            StressBand::Critical => "Critical",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Breakpoint, CSI_ALPHA, CSI_BREAKPOINTS, ColorScale, ColorScaleError, StressBand};
    use foundation::color::Rgba;

    #[test]
    fn exact_at_every_breakpoint() {
        let scale = ColorScale::csi();
        for bp in CSI_BREAKPOINTS {
            assert_eq!(scale.color_for(bp.value), Rgba::rgb(bp.rgb, CSI_ALPHA), "at {}", bp.value);
        }
    }

    #[test]
    fn interpolated_channels_stay_between_neighbours() {
        let scale = ColorScale::csi();
        for pair in CSI_BREAKPOINTS.windows(2) {
            let (lo, hi) = (pair[0], pair[1]);
            let mut v = lo.value + 0.5;
            while v < hi.value {
                let c = scale.color_for(v).channels();
                for ch in 0..3 {
                    let (a, b) = (lo.rgb[ch], hi.rgb[ch]);
                    assert!(c[ch] >= a.min(b) && c[ch] <= a.max(b), "v={v} ch={ch}");
                }
                v += 0.5;
            }
        }
    }

    #[test]
    fn midpoint_of_first_segment() {
        let c = ColorScale::csi().color_for(10.0);
        assert_eq!(c, Rgba::new(75, 150, 75, CSI_ALPHA));
    }

    #[test]
    fn clamps_instead_of_extrapolating() {
        let scale = ColorScale::csi();
        assert_eq!(scale.color_for(100.0), scale.color_for(150.0));
        assert_eq!(scale.color_for(100.0), scale.color_for(f64::INFINITY));
        assert_eq!(scale.color_for(-20.0), scale.color_for(0.0));
        assert_eq!(scale.color_for(f64::NAN), scale.color_for(0.0));
        assert_eq!(scale.color_for(95.0).a, CSI_ALPHA);
    }

    #[test]
    fn custom_scale_validation() {
        let bp = |v, c| Breakpoint::new(v, [c, c, c]);
        assert_eq!(
            ColorScale::new(vec![bp(0.0, 0)], 255).unwrap_err(),
            ColorScaleError::TooFewBreakpoints
        );
        assert_eq!(
            ColorScale::new(vec![bp(5.0, 0), bp(100.0, 9)], 255).unwrap_err(),
            ColorScaleError::FirstNotZero { value: 5.0 }
        );
        assert_eq!(
            ColorScale::new(vec![bp(0.0, 0), bp(50.0, 1), bp(50.0, 2), bp(100.0, 3)], 255)
                .unwrap_err(),
            ColorScaleError::NotIncreasing { index: 2 }
        );
        assert_eq!(
            ColorScale::new(vec![bp(0.0, 0), bp(90.0, 9)], 255).unwrap_err(),
            ColorScaleError::LastBelowMax { value: 90.0 }
        );

        let grey = ColorScale::new(vec![bp(0.0, 0), bp(200.0, 200)], 255).expect("valid");
        // Inputs clamp at 100 even when the table extends further.
        assert_eq!(grey.color_for(150.0), Rgba::new(100, 100, 100, 255));
    }

    #[test]
    fn deserialization_validates() {
        let ok: ColorScale = serde_json::from_str(
            r#"{"breakpoints":[{"value":0,"rgb":[0,0,0]},{"value":100,"rgb":[10,10,10]}],"alpha":9}"#,
        )
        .expect("valid scale");
        assert_eq!(ok.alpha(), 9);

        let bad = serde_json::from_str::<ColorScale>(
            r#"{"breakpoints":[{"value":0,"rgb":[0,0,0]}],"alpha":9}"#,
        );
        assert!(bad.is_err());

        let back = serde_json::to_value(ColorScale::csi()).expect("serialize");
        assert_eq!(back["breakpoints"].as_array().map(Vec::len), Some(8));
    }

    #[test]
    fn legend_bands() {
        assert_eq!(StressBand::of(0.0), StressBand::Low);
        assert_eq!(StressBand::of(20.0), StressBand::ModerateLow);
        assert_eq!(StressBand::of(59.9), StressBand::Moderate);
        assert_eq!(StressBand::of(75.0), StressBand::High);
        assert_eq!(StressBand::of(100.0), StressBand::Critical);
        assert_eq!(StressBand::Critical.label(), "Critical");
    }
}
