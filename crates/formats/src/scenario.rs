use serde::{Deserialize, Serialize};

/// Hypothetical 2035 adjustments driven by the scenario sliders.
///
/// - `car`: change in car dependence, `[-1, 0]`.
/// - `trees`: tree investment, `[0, 1]`.
/// - `transit`: transit investment, `[0, 1]`.
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ScenarioParams {
    pub car: f64,
    pub trees: f64,
    pub transit: f64,
}

impl ScenarioParams {
    pub const fn new(car: f64, trees: f64, transit: f64) -> Self {
        Self {
            car,
            trees,
            transit,
        }
    }

    /// A scenario is active iff any component is non-zero.
    pub fn is_active(&self) -> bool {
        self.car != 0.0 || self.trees != 0.0 || self.transit != 0.0
    }

    /// Force each component into its slider range; NaN becomes 0.
    pub fn clamped(self) -> Self {
        fn fit(v: f64, lo: f64, hi: f64) -> f64 {
            if v.is_nan() { 0.0 } else { v.clamp(lo, hi) }
        }
        Self::new(
            fit(self.car, -1.0, 0.0),
            fit(self.trees, 0.0, 1.0),
            fit(self.transit, 0.0, 1.0),
        )
    }

    /// Backend scenario label: `"2035"` when active, `"current"` otherwise.
    pub fn label(&self) -> &'static str {
        if self.is_active() { "2035" } else { "current" }
    }
}

#[cfg(test)]
mod tests {
    use super::ScenarioParams;

    #[test]
    fn activity_tracks_any_nonzero_component() {
        assert!(!ScenarioParams::default().is_active());
        assert!(ScenarioParams::new(-0.2, 0.0, 0.0).is_active());
        assert!(ScenarioParams::new(0.0, 0.5, 0.0).is_active());
        assert!(ScenarioParams::new(0.0, 0.0, 0.1).is_active());
        assert_eq!(ScenarioParams::default().label(), "current");
        assert_eq!(ScenarioParams::new(0.0, 0.5, 0.0).label(), "2035");
    }

    #[test]
    fn clamped_respects_slider_ranges() {
        let p = ScenarioParams::new(0.4, 1.7, f64::NAN).clamped();
        assert_eq!(p, ScenarioParams::new(0.0, 1.0, 0.0));
        let p = ScenarioParams::new(-3.0, -0.1, 0.25).clamped();
        assert_eq!(p, ScenarioParams::new(-1.0, 0.0, 0.25));
    }
}
