//! Pooled projectiles and the turret that fires them

use glam::Vec2;

use crate::{angle_between, direction};

/// A projectile slot in the pool
#[derive(Debug, Clone)]
pub struct Projectile {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub active: bool,
    /// Logical clock time (ms) at which it was fired
    pub fired_at: f64,
}

/// Fixed-capacity projectile pool.
///
/// Slots are reused once deactivated; acquiring from a full pool returns
/// `None` and the shot is dropped.
#[derive(Debug, Clone)]
pub struct ProjectilePool {
    slots: Vec<Projectile>,
    capacity: usize,
}

impl ProjectilePool {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Activate a slot with the given state; `None` when every slot is live
    pub fn acquire(
        &mut self,
        id: u32,
        pos: Vec2,
        vel: Vec2,
        radius: f32,
        now: f64,
    ) -> Option<&Projectile> {
        let fresh = Projectile {
            id,
            pos,
            vel,
            radius,
            active: true,
            fired_at: now,
        };

        if let Some(idx) = self.slots.iter().position(|p| !p.active) {
            self.slots[idx] = fresh;
            return self.slots.get(idx);
        }
        if self.slots.len() < self.capacity {
            self.slots.push(fresh);
            return self.slots.last();
        }
        None
    }

    /// Deactivate the projectile with `id`; false if it is not live
    pub fn release(&mut self, id: u32) -> bool {
        match self.slots.iter_mut().find(|p| p.active && p.id == id) {
            Some(p) => {
                p.active = false;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, id: u32) -> Option<&Projectile> {
        self.slots.iter().find(|p| p.active && p.id == id)
    }

    pub fn active(&self) -> impl Iterator<Item = &Projectile> {
        self.slots.iter().filter(|p| p.active)
    }

    pub fn active_mut(&mut self) -> impl Iterator<Item = &mut Projectile> {
        self.slots.iter_mut().filter(|p| p.active)
    }

    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|p| p.active).count()
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }
}

/// Player turret at the bottom of the field
#[derive(Debug, Clone)]
pub struct Turret {
    pub pos: Vec2,
    /// Aim angle in radians (screen space, -π/2 = straight up)
    pub aim: f32,
}

impl Turret {
    pub fn new(field_width: f32, field_height: f32, offset: f32) -> Self {
        Self {
            pos: Vec2::new(field_width / 2.0, field_height - offset),
            aim: -std::f32::consts::FRAC_PI_2,
        }
    }

    /// Rotate to face the pointer
    pub fn aim_at(&mut self, pointer: Vec2) {
        if pointer != self.pos {
            self.aim = angle_between(self.pos, pointer);
        }
    }

    /// Launch velocity along the current aim
    pub fn muzzle_velocity(&self, speed: f32) -> Vec2 {
        direction(self.aim) * speed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_caps_and_reuses_slots() {
        let mut pool = ProjectilePool::new(2);
        assert!(pool.acquire(1, Vec2::ZERO, Vec2::Y, 6.0, 0.0).is_some());
        assert!(pool.acquire(2, Vec2::ZERO, Vec2::Y, 6.0, 0.0).is_some());
        assert!(pool.acquire(3, Vec2::ZERO, Vec2::Y, 6.0, 0.0).is_none());
        assert_eq!(pool.active_count(), 2);

        assert!(pool.release(1));
        assert!(!pool.release(1));
        let reused = pool.acquire(4, Vec2::ONE, Vec2::Y, 6.0, 5.0).map(|p| p.id);
        assert_eq!(reused, Some(4));
        assert!(pool.get(1).is_none());
        assert_eq!(pool.active_count(), 2);
    }

    #[test]
    fn test_turret_aims_at_pointer() {
        let mut turret = Turret::new(800.0, 600.0, 80.0);
        assert_eq!(turret.pos, Vec2::new(400.0, 520.0));

        turret.aim_at(Vec2::new(600.0, 520.0));
        let v = turret.muzzle_velocity(500.0);
        assert!((v.x - 500.0).abs() < 1e-3);
        assert!(v.y.abs() < 1e-3);

        // Pointer on the turret itself keeps the previous aim
        turret.aim_at(turret.pos);
        assert!(turret.aim.abs() < 1e-6);
    }
}
