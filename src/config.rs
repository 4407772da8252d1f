use anyhow::{ensure, Result};

use crate::vec3::{Point3, Vec3};

/// Everything that shapes the image. `Default` is the reference render.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderConfig {
    pub width: usize,
    pub height: usize,
    pub fov_degrees: f64,
    pub max_steps: u32,
    pub hit_threshold: f64,
    /// Where marching starts along the ray, keeps the first sample off the origin.
    pub start_distance: f64,
    pub origin: Point3,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
            fov_degrees: 45.,
            max_steps: 64,
            hit_threshold: 0.001,
            start_distance: 0.01,
            origin: Vec3::empty(),
        }
    }
}

impl RenderConfig {
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.width > 0 && self.height > 0,
            "empty raster {}x{}",
            self.width,
            self.height
        );
        ensure!(
            self.fov_degrees > 0. && self.fov_degrees < 180.,
            "field of view must be in (0, 180) degrees, got {}",
            self.fov_degrees
        );
        ensure!(
            self.hit_threshold > 0.,
            "hit threshold must be positive, got {}",
            self.hit_threshold
        );
        ensure!(
            self.start_distance >= 0.,
            "start distance must not be negative, got {}",
            self.start_distance
        );
        Ok(())
    }
}

#[test]
fn test_validate() {
    assert!(RenderConfig::default().validate().is_ok());

    let bad = [
        RenderConfig {
            width: 0,
            ..RenderConfig::default()
        },
        RenderConfig {
            height: 0,
            ..RenderConfig::default()
        },
        RenderConfig {
            fov_degrees: 180.,
            ..RenderConfig::default()
        },
        RenderConfig {
            fov_degrees: 0.,
            ..RenderConfig::default()
        },
        RenderConfig {
            hit_threshold: 0.,
            ..RenderConfig::default()
        },
        RenderConfig {
            start_distance: -1.,
            ..RenderConfig::default()
        },
    ];
    for cfg in &bad {
        assert!(cfg.validate().is_err(), "{:?}", cfg);
    }
}
