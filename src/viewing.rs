//! Viewing condition modeling for perceptual error evaluation.
//!
//! Error evaluators that model the visual system need to know how many image
//! pixels fall into one degree of visual angle (pixels per degree, PPD). This
//! module derives it from the physical setup: the observer's distance to the
//! monitor, the monitor's horizontal resolution and its physical width.
//!
//! ```text
//! ppd = distance * (resolution_x / monitor_width) * (pi / 180)
//! ```

use serde::{Deserialize, Serialize};

/// Physical viewing setup for a comparison.
///
/// # Example
///
/// ```
/// use diffpool::ViewingCondition;
///
/// // 4K monitor, 0.7 m wide, viewed from 0.7 m
/// let condition = ViewingCondition::default();
/// assert!((condition.ppd() - 67.02).abs() < 0.01);
///
/// let fixed = ViewingCondition::default().with_ppd_override(40.0);
/// assert_eq!(fixed.ppd(), 40.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewingCondition {
    /// Distance from the observer to the monitor, in meters.
    pub distance_m: f64,

    /// Horizontal resolution of the monitor, in pixels.
    pub resolution_x: u32,

    /// Physical width of the monitor, in meters.
    pub monitor_width_m: f64,

    /// Explicit PPD, bypassing the physical model when set.
    pub ppd: Option<f64>,
}

impl Default for ViewingCondition {
    fn default() -> Self {
        Self::desktop_4k()
    }
}

impl ViewingCondition {
    /// Create a viewing condition from the physical setup.
    #[must_use]
    pub fn new(distance_m: f64, resolution_x: u32, monitor_width_m: f64) -> Self {
        Self {
            distance_m,
            resolution_x,
            monitor_width_m,
            ppd: None,
        }
    }

    /// 0.7 m wide 3840-pixel monitor viewed from 0.7 m (about 67 PPD).
    #[must_use]
    pub fn desktop_4k() -> Self {
        Self::new(0.7, 3840, 0.7)
    }

    /// 0.30 m wide 2560-pixel laptop panel viewed from 0.5 m (about 74 PPD).
    #[must_use]
    pub fn laptop() -> Self {
        Self::new(0.5, 2560, 0.30)
    }

    /// Use a fixed PPD instead of the physical model.
    #[must_use]
    pub fn with_ppd_override(mut self, ppd: f64) -> Self {
        self.ppd = Some(ppd);
        self
    }

    /// Pixels per degree of visual angle.
    #[must_use]
    pub fn ppd(&self) -> f64 {
        if let Some(ppd) = self.ppd {
            return ppd;
        }
        self.distance_m * (f64::from(self.resolution_x) / self.monitor_width_m) * (std::f64::consts::PI / 180.0)
    }
}
