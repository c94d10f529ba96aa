//! Host settings, restored from eframe storage when `persistence` is enabled.

use crate::koch::{Depth, DEFAULT_SIZE};

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SnowflakeConfig {
    pub depth: Depth,
    /// Side length of the base triangle.
    pub size: f64,
    /// Half-width of the visible square, like `gluOrtho2D(-e, e, -e, e)`.
    pub view_extent: f32,
}

impl Default for SnowflakeConfig {
    fn default() -> Self {
        Self {
            depth: Depth::DEFAULT,
            size: DEFAULT_SIZE,
            view_extent: 1.5,
        }
    }
}

impl SnowflakeConfig {
    /// Scale applied in the vertex shader to map the view square onto NDC.
    pub fn scale(&self) -> f32 {
        1.0 / self.view_extent
    }
}
