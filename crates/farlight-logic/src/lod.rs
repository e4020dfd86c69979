//! Render level-of-detail tiers from camera distance.
//!
//! With 10⁴–10⁵ catalog objects potentially in view, the emitter cannot
//! describe every object at full fidelity. This module classifies objects
//! into render tiers by distance alone; it is a pure function of
//! (camera, object, config). Hysteresis across tier boundaries is the
//! presentation host's concern, not handled here.

use serde::{Deserialize, Serialize};

use crate::vec3::Vec3;

/// Render-complexity tier for one object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LodTier {
    /// Close enough for a fully modelled body.
    Full3D,
    /// Camera-facing textured quad.
    Billboard,
    /// Flat shaded disc.
    Circle,
    /// Single point sample.
    Point,
    /// Not drawn at all.
    Culled,
}

/// Distance thresholds, in catalog-space units. Each tier applies strictly
/// below its threshold; at or beyond `point_max` the object is culled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LodConfig {
    pub full3d_max: f64,
    pub billboard_max: f64,
    pub circle_max: f64,
    pub point_max: f64,
}

impl Default for LodConfig {
    fn default() -> Self {
        Self {
            full3d_max: 50.0,
            billboard_max: 200.0,
            circle_max: 1000.0,
            point_max: 10_000.0,
        }
    }
}

/// Classify one object by camera distance.
pub fn classify(camera: &Vec3, object: &Vec3, config: &LodConfig) -> LodTier {
    classify_distance(camera.distance(object), config)
}

/// Classify a precomputed distance. Saves the square root when the caller
/// already has it from a spatial query.
pub fn classify_distance(distance: f64, config: &LodConfig) -> LodTier {
    if distance < config.full3d_max {
        LodTier::Full3D
    } else if distance < config.billboard_max {
        LodTier::Billboard
    } else if distance < config.circle_max {
        LodTier::Circle
    } else if distance < config.point_max {
        LodTier::Point
    } else {
        LodTier::Culled
    }
}

/// Tier distribution over a frame, reported in the debug payload.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct LodStats {
    pub full3d: usize,
    pub billboard: usize,
    pub circle: usize,
    pub point: usize,
    pub culled: usize,
}

impl LodStats {
    pub fn record(&mut self, tier: LodTier) {
        match tier {
            LodTier::Full3D => self.full3d += 1,
            LodTier::Billboard => self.billboard += 1,
            LodTier::Circle => self.circle += 1,
            LodTier::Point => self.point += 1,
            LodTier::Culled => self.culled += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.full3d + self.billboard + self.circle + self.point + self.culled
    }

    /// Count of objects that produce at least one draw command.
    pub fn drawn(&self) -> usize {
        self.total() - self.culled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiers_by_distance() {
        let config = LodConfig::default();
        let cam = Vec3::ZERO;
        assert_eq!(
            classify(&cam, &Vec3::new(10.0, 0.0, 0.0), &config),
            LodTier::Full3D
        );
        assert_eq!(
            classify(&cam, &Vec3::new(100.0, 0.0, 0.0), &config),
            LodTier::Billboard
        );
        assert_eq!(
            classify(&cam, &Vec3::new(500.0, 0.0, 0.0), &config),
            LodTier::Circle
        );
        assert_eq!(
            classify(&cam, &Vec3::new(5000.0, 0.0, 0.0), &config),
            LodTier::Point
        );
        assert_eq!(
            classify(&cam, &Vec3::new(20_000.0, 0.0, 0.0), &config),
            LodTier::Culled
        );
    }

    #[test]
    fn boundaries_are_exclusive() {
        let config = LodConfig::default();
        assert_eq!(classify_distance(50.0, &config), LodTier::Billboard);
        assert_eq!(classify_distance(10_000.0, &config), LodTier::Culled);
        assert_eq!(classify_distance(9_999.9, &config), LodTier::Point);
    }

    #[test]
    fn zero_distance_is_full3d() {
        let config = LodConfig::default();
        assert_eq!(classify_distance(0.0, &config), LodTier::Full3D);
    }

    #[test]
    fn stats_accumulate() {
        let config = LodConfig::default();
        let mut stats = LodStats::default();
        for d in [1.0, 60.0, 300.0, 2000.0, 50_000.0, 70.0] {
            stats.record(classify_distance(d, &config));
        }
        assert_eq!(stats.full3d, 1);
        assert_eq!(stats.billboard, 2);
        assert_eq!(stats.circle, 1);
        assert_eq!(stats.point, 1);
        assert_eq!(stats.culled, 1);
        assert_eq!(stats.total(), 6);
        assert_eq!(stats.drawn(), 5);
    }
}
