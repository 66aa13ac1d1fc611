//! Planar geometry helpers shared by the world and the pure systems.
//!
//! The alley lies in the XZ plane with Y pointing up. Headings are yaw angles
//! measured around the Y axis so that a heading of zero faces positive Z.

use glam::{Quat, Vec3};

/// Axis-aligned bounding box used for every collision query.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    min: Vec3,
    max: Vec3,
}

impl Aabb {
    /// Creates a bounding box from explicit corners.
    #[must_use]
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self {
            min: min.min(max),
            max: max.max(min),
        }
    }

    /// Creates a bounding box centred on `center` with the provided half extents.
    #[must_use]
    pub fn from_center(center: Vec3, half_extents: Vec3) -> Self {
        let half = half_extents.abs();
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Lower corner of the box.
    #[must_use]
    pub const fn min(&self) -> Vec3 {
        self.min
    }

    /// Upper corner of the box.
    #[must_use]
    pub const fn max(&self) -> Vec3 {
        self.max
    }

    /// Centre point of the box.
    #[must_use]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Reports whether two boxes overlap. Touching faces count as an overlap.
    #[must_use]
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    /// Reports whether every coordinate of the box is finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.min.is_finite() && self.max.is_finite()
    }
}

/// Flattens `vector` onto the ground plane and normalises it.
///
/// Returns [`Vec3::ZERO`] when the flattened vector has no length.
#[must_use]
pub fn planar_direction(vector: Vec3) -> Vec3 {
    Vec3::new(vector.x, 0.0, vector.z).normalize_or_zero()
}

/// Heading that makes an entity at `from` face `to`.
#[must_use]
pub fn heading_towards(from: Vec3, to: Vec3) -> f32 {
    heading_of(to - from)
}

/// Heading that points along `direction`.
#[must_use]
pub fn heading_of(direction: Vec3) -> f32 {
    direction.x.atan2(direction.z)
}

/// Unit forward vector for the provided heading.
#[must_use]
pub fn forward(heading: f32) -> Vec3 {
    Vec3::new(heading.sin(), 0.0, heading.cos())
}

/// Rotates a direction around the Y axis by `angle` radians.
#[must_use]
pub fn rotate_y(direction: Vec3, angle: f32) -> Vec3 {
    Quat::from_rotation_y(angle) * direction
}

/// Reports whether `target` lies within ±90° of the facing direction.
#[must_use]
pub fn within_forward_arc(position: Vec3, heading: f32, target: Vec3) -> bool {
    let to_target = planar_direction(target - position);
    if to_target == Vec3::ZERO {
        return true;
    }
    forward(heading).dot(to_target) >= 0.0
}

/// Planar distance between two points, ignoring height.
#[must_use]
pub fn planar_distance(a: Vec3, b: Vec3) -> f32 {
    let dx = a.x - b.x;
    let dz = a.z - b.z;
    (dx * dx + dz * dz).sqrt()
}
