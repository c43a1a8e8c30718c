use cgmath::{Vector3, Zero};

/// The animated pose of one item in the stack.
///
/// `position.y` is in stack units (the same space as the scroll offset),
/// `position.z` lifts the item toward the viewer. `slide` is how far the inner
/// vinyl has left its sleeve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vector3<f32>,
    pub rotation: Vector3<f32>,
    pub scale: f32,
    pub slide: f32,
}

impl Transform {
    pub fn new(position: Vector3<f32>, rotation: Vector3<f32>, scale: f32, slide: f32) -> Self {
        Self {
            position,
            rotation,
            scale,
            slide,
        }
    }

    /// Exponential smoothing toward `target`: every property moves by
    /// `min(rate * dt, 1)` of the remaining distance.
    pub fn approach(&mut self, target: &Transform, rate: f32, dt: f32) {
        let t = (rate * dt).clamp(0.0, 1.0);
        self.position += (target.position - self.position) * t;
        self.rotation += (target.rotation - self.rotation) * t;
        self.scale += (target.scale - self.scale) * t;
        self.slide += (target.slide - self.slide) * t;
    }

    /// Largest per-property distance to `other`.
    pub fn distance(&self, other: &Transform) -> f32 {
        let dp = other.position - self.position;
        let dr = other.rotation - self.rotation;
        [
            dp.x, dp.y, dp.z, dr.x, dr.y, dr.z,
            other.scale - self.scale,
            other.slide - self.slide,
        ]
        .iter()
        .fold(0.0f32, |max, d| max.max(d.abs()))
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new(Vector3::zero(), Vector3::zero(), 1.0, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: f32, z: f32) -> Transform {
        Transform::new(Vector3::new(0.0, y, z), Vector3::zero(), 1.0, 0.0)
    }

    #[test]
    fn test_approach_moves_by_rate_fraction() {
        let mut t = at(0.0, 0.0);
        t.approach(&at(1.0, 2.0), 5.0, 0.1);
        assert!((t.position.y - 0.5).abs() < 1e-6);
        assert!((t.position.z - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_approach_never_overshoots() {
        let mut t = at(0.0, 0.0);
        // rate * dt > 1 (e.g. a long stall between frames) snaps to the target
        t.approach(&at(3.0, -1.0), 6.0, 2.0);
        assert_eq!(t, at(3.0, -1.0));
    }

    #[test]
    fn test_distance_is_max_component() {
        let mut target = at(0.5, -0.2);
        target.slide = 1.2;
        assert!((at(0.0, 0.0).distance(&target) - 1.2).abs() < 1e-6);
        assert_eq!(target.distance(&target), 0.0);
    }
}
