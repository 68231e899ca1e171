//! Collision detection and response for boxes and circles
//!
//! Targets are axis-aligned boxes centered on their body position;
//! projectiles are circles. Screen space: +y points down.

use glam::Vec2;

/// Axis-aligned box given by center and half extents
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub center: Vec2,
    pub half: Vec2,
}

impl Aabb {
    pub fn new(center: Vec2, size: Vec2) -> Self {
        Self {
            center,
            half: size * 0.5,
        }
    }

    #[inline]
    pub fn min(&self) -> Vec2 {
        self.center - self.half
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        self.center + self.half
    }

    /// Closest point inside the box to `p`
    #[inline]
    pub fn clamp_point(&self, p: Vec2) -> Vec2 {
        p.clamp(self.min(), self.max())
    }
}

/// Result of a collision check
#[derive(Debug, Clone)]
pub struct CollisionResult {
    /// Whether a collision occurred
    pub hit: bool,
    /// Contact point (if hit)
    pub point: Vec2,
    /// Separation normal, pointing from the second shape toward the first
    pub normal: Vec2,
    /// Penetration depth (for position correction)
    pub penetration: f32,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            point: Vec2::ZERO,
            normal: Vec2::ZERO,
            penetration: 0.0,
        }
    }
}

/// Circle vs box overlap (projectile vs target)
pub fn circle_aabb_collision(center: Vec2, radius: f32, aabb: &Aabb) -> CollisionResult {
    let closest = aabb.clamp_point(center);
    let offset = center - closest;
    let dist_sq = offset.length_squared();

    if dist_sq > radius * radius {
        return CollisionResult::miss();
    }

    if dist_sq > 1e-8 {
        let dist = dist_sq.sqrt();
        return CollisionResult {
            hit: true,
            point: closest,
            normal: offset / dist,
            penetration: radius - dist,
        };
    }

    // Center inside the box: push out along the shallowest axis
    let local = center - aabb.center;
    let depth = aabb.half - local.abs();
    let normal = if depth.x < depth.y {
        Vec2::new(local.x.signum(), 0.0)
    } else {
        Vec2::new(0.0, local.y.signum())
    };
    CollisionResult {
        hit: true,
        point: center,
        normal,
        penetration: depth.x.min(depth.y) + radius,
    }
}

/// Box vs box overlap (target vs target)
///
/// The normal points from `b` toward `a` along the axis of least penetration.
pub fn aabb_aabb_collision(a: &Aabb, b: &Aabb) -> CollisionResult {
    let delta = a.center - b.center;
    let overlap = (a.half + b.half) - delta.abs();

    if overlap.x <= 0.0 || overlap.y <= 0.0 {
        return CollisionResult::miss();
    }

    let (normal, penetration) = if overlap.x < overlap.y {
        (Vec2::new(sign_or_one(delta.x), 0.0), overlap.x)
    } else {
        (Vec2::new(0.0, sign_or_one(delta.y)), overlap.y)
    };

    CollisionResult {
        hit: true,
        point: b.clamp_point(a.center),
        normal,
        penetration,
    }
}

/// Check a box against the left/right field walls
pub fn side_wall_collision(aabb: &Aabb, field_width: f32) -> CollisionResult {
    let min = aabb.min();
    let max = aabb.max();
    if min.x < 0.0 {
        CollisionResult {
            hit: true,
            point: Vec2::new(0.0, aabb.center.y),
            normal: Vec2::X,
            penetration: -min.x,
        }
    } else if max.x > field_width {
        CollisionResult {
            hit: true,
            point: Vec2::new(field_width, aabb.center.y),
            normal: Vec2::NEG_X,
            penetration: max.x - field_width,
        }
    } else {
        CollisionResult::miss()
    }
}

/// Reflect velocity off a surface
///
/// Standard reflection: v' = v - 2(v·n)n
#[inline]
pub fn reflect_velocity(velocity: Vec2, normal: Vec2) -> Vec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}

/// Elastic response between two equal-mass bodies (bounce = 1).
///
/// Exchanges the velocity components along `normal` when the bodies are
/// approaching; leaves separating bodies alone.
pub fn bounce_pair(va: Vec2, vb: Vec2, normal: Vec2) -> (Vec2, Vec2) {
    let approach = (va - vb).dot(normal);
    if approach >= 0.0 {
        return (va, vb);
    }
    let a_n = va.dot(normal);
    let b_n = vb.dot(normal);
    (va + normal * (b_n - a_n), vb + normal * (a_n - b_n))
}

#[inline]
fn sign_or_one(v: f32) -> f32 {
    if v < 0.0 { -1.0 } else { 1.0 }
}
