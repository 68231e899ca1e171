//! Fixed timestep simulation tick
//!
//! Frame order: clock + deferred actions, input, integration, target
//! contacts, boundary handling, then hit detection and resolution. The
//! outcome callback therefore runs before the frame is rendered.

use glam::Vec2;

use super::collision::{aabb_aabb_collision, bounce_pair, circle_aabb_collision, side_wall_collision};
use super::state::{Resolution, Session, SessionPhase};
use super::target::{TargetLifecycle, random_spawn_y, random_velocity};
use super::timer::DeferredAction;
use rand::Rng;

/// Input for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Pointer position in field coordinates (aiming)
    pub pointer: Option<Vec2>,
    /// Pointer press this tick
    pub fire: bool,
    /// Restart with this seed
    pub restart: Option<u64>,
}

/// What happened during a tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickEvents {
    pub fired: Option<u32>,
    pub resolved: Option<Resolution>,
    /// Round index spawned by a deferred transition
    pub spawned_round: Option<usize>,
    /// Projectiles removed for leaving the field or timing out
    pub projectiles_removed: usize,
    /// Targets that wrapped from the bottom back to the top
    pub targets_wrapped: usize,
}

/// Advance the session by one fixed timestep
pub fn tick(session: &mut Session, input: &TickInput, dt: f32) -> TickEvents {
    let mut events = TickEvents::default();

    if session.phase == SessionPhase::Closed {
        return events;
    }

    if let Some(seed) = input.restart {
        session.restart(seed);
    }

    session.scheduler.advance(dt);
    run_deferred(session, &mut events);

    if let Some(pointer) = input.pointer {
        session.aim(pointer);
    }
    if input.fire {
        events.fired = session.fire();
    }

    integrate(session, dt);
    resolve_target_contacts(session);
    physics_step(session, &mut events);
    events.resolved = detect_hits(session);

    events
}

/// Run every deferred action that has come due
fn run_deferred(session: &mut Session, events: &mut TickEvents) {
    for action in session.scheduler.drain_due() {
        match action {
            DeferredAction::SpawnRound { round_index } => {
                if session.phase == SessionPhase::Resolving && session.spawn_round(round_index) {
                    events.spawned_round = Some(round_index);
                }
            }
            DeferredAction::ExpireProjectile { projectile_id } => {
                if session.projectiles.release(projectile_id) {
                    events.projectiles_removed += 1;
                }
            }
            DeferredAction::ClearFeedback { shown_at_round } => {
                if session
                    .feedback
                    .as_ref()
                    .is_some_and(|f| f.round_index == shown_at_round)
                {
                    session.feedback = None;
                }
            }
        }
    }
}

/// Position/velocity integration for every live body
fn integrate(session: &mut Session, dt: f32) {
    for projectile in session.projectiles.active_mut() {
        projectile.pos += projectile.vel * dt;
    }
    for target in &mut session.targets {
        target.pos += target.vel * dt;
        target.lifecycle = TargetLifecycle::Live;
    }
}

/// Bounce targets off each other and off the side walls
fn resolve_target_contacts(session: &mut Session) {
    let field_width = session.settings.field_width;
    let targets = &mut session.targets;

    for i in 0..targets.len() {
        for j in (i + 1)..targets.len() {
            let result = aabb_aabb_collision(&targets[i].aabb(), &targets[j].aabb());
            if !result.hit {
                continue;
            }
            let push = result.normal * (result.penetration * 0.5);
            let (va, vb) = bounce_pair(targets[i].vel, targets[j].vel, result.normal);
            targets[i].pos += push;
            targets[i].vel = va;
            targets[j].pos -= push;
            targets[j].vel = vb;
        }
    }

    for target in targets.iter_mut() {
        let wall = side_wall_collision(&target.aabb(), field_width);
        if wall.hit {
            target.pos += wall.normal * wall.penetration;
            if target.vel.dot(wall.normal) < 0.0 {
                target.vel = super::collision::reflect_velocity(target.vel, wall.normal);
            }
        }
    }
}

/// Boundary handling: cull stray projectiles, keep labels on their bodies,
/// wrap targets that fell past the bottom back above the top
fn physics_step(session: &mut Session, events: &mut TickEvents) {
    let width = session.settings.field_width;
    let height = session.settings.field_height;
    let margin = session.settings.cull_margin;

    let out_of_bounds: Vec<u32> = session
        .projectiles
        .active()
        .filter(|p| {
            p.pos.x < -margin || p.pos.x > width + margin || p.pos.y < -margin || p.pos.y > height + margin
        })
        .map(|p| p.id)
        .collect();
    for id in out_of_bounds {
        if session.projectiles.release(id) {
            events.projectiles_removed += 1;
        }
    }

    let wrap_y = height + session.settings.wrap_margin;
    let inset = session.settings.wrap_inset.min(width / 2.0);
    for target in &mut session.targets {
        if target.pos.y > wrap_y {
            let x = if width - inset > inset {
                session.rng.random_range(inset..=width - inset)
            } else {
                width / 2.0
            };
            target.pos = Vec2::new(x, random_spawn_y(&session.settings, &mut session.rng));
            target.vel = random_velocity(&session.settings, &mut session.rng);
            events.targets_wrapped += 1;
        }
        target.sync_label();
    }
}

/// Find the first projectile/target overlap and resolve the round with it.
///
/// Later overlaps in the same tick are stale: the first resolution already
/// destroyed every target.
fn detect_hits(session: &mut Session) -> Option<Resolution> {
    if session.phase != SessionPhase::AwaitingShot {
        return None;
    }

    let hit = session.projectiles.active().find_map(|p| {
        session
            .targets
            .iter()
            .find(|t| circle_aabb_collision(p.pos, p.radius, &t.aabb()).hit)
            .map(|t| (p.id, t.id))
    })?;

    session.resolve_hit(hit.0, hit.1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::settings::Settings;
    use crate::sim::pairs::Pair;

    fn session(seed: u64) -> Session {
        let pairs = vec![
            Pair::new("API", "a"),
            Pair::new("REST", "b"),
            Pair::new("JSON", "c"),
            Pair::new("HTTP", "d"),
        ];
        Session::new(pairs, Settings::default(), seed, |_| {}).expect("valid session")
    }

    #[test]
    fn test_labels_follow_bodies() {
        let mut s = session(1);
        for _ in 0..30 {
            tick(&mut s, &TickInput::default(), SIM_DT);
        }
        for t in s.targets() {
            assert_eq!(t.label.pos, t.pos);
            assert_eq!(t.lifecycle, TargetLifecycle::Live);
        }
    }

    #[test]
    fn test_fallen_target_wraps_with_identity() {
        let mut s = session(2);
        let before: Vec<(u32, String, bool)> = s
            .targets
            .iter()
            .map(|t| (t.id, t.label.text.clone(), t.correct))
            .collect();
        s.targets[0].pos.y = 600.0 + 100.0 + 1.0;

        let events = tick(&mut s, &TickInput::default(), SIM_DT);
        assert_eq!(events.targets_wrapped, 1);

        let t = &s.targets[0];
        assert!(t.pos.y < 0.0);
        assert!((100.0..=700.0).contains(&t.pos.x));
        assert_eq!(t.label.pos, t.pos);
        let after: Vec<(u32, String, bool)> = s
            .targets
            .iter()
            .map(|t| (t.id, t.label.text.clone(), t.correct))
            .collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_offscreen_projectile_is_culled() {
        let mut s = session(3);
        // Aim away from every target: straight down-left out of the field
        let input = TickInput {
            pointer: Some(Vec2::new(0.0, 600.0)),
            fire: true,
            ..Default::default()
        };
        let events = tick(&mut s, &input, SIM_DT);
        assert!(events.fired.is_some());
        assert_eq!(s.projectiles().active_count(), 1);

        let mut removed = 0;
        for _ in 0..120 {
            removed += tick(&mut s, &TickInput::default(), SIM_DT).projectiles_removed;
        }
        assert_eq!(removed, 1);
        assert_eq!(s.projectiles().active_count(), 0);
    }

    #[test]
    fn test_projectile_expires_after_lifetime() {
        let mut settings = Settings::default();
        settings.projectile_speed = 0.0;
        let pairs = vec![
            Pair::new("A", "a"),
            Pair::new("B", "b"),
            Pair::new("C", "c"),
            Pair::new("D", "d"),
        ];
        let mut s = Session::new(pairs, settings, 4, |_| {}).expect("valid session");
        assert!(s.fire().is_some());

        // 3000 ms lifetime: still alive at 2.9 s, gone by 3.1 s
        for _ in 0..174 {
            tick(&mut s, &TickInput::default(), SIM_DT);
        }
        assert_eq!(s.projectiles().active_count(), 1);
        for _ in 0..12 {
            tick(&mut s, &TickInput::default(), SIM_DT);
        }
        assert_eq!(s.projectiles().active_count(), 0);
    }

    #[test]
    fn test_targets_bounce_off_each_other() {
        let mut s = session(5);
        s.targets[0].pos = Vec2::new(300.0, 200.0);
        s.targets[0].vel = Vec2::new(30.0, 0.0);
        s.targets[1].pos = Vec2::new(435.0, 200.0);
        s.targets[1].vel = Vec2::new(-30.0, 0.0);
        s.targets[2].pos = Vec2::new(300.0, 400.0);
        s.targets[3].pos = Vec2::new(600.0, 400.0);

        tick(&mut s, &TickInput::default(), SIM_DT);
        assert!(s.targets[0].vel.x < 0.0);
        assert!(s.targets[1].vel.x > 0.0);
        assert!(s.targets[1].pos.x - s.targets[0].pos.x >= 140.0 - 1e-3);
    }

    #[test]
    fn test_target_bounces_off_side_wall() {
        let mut s = session(6);
        s.targets[0].pos = Vec2::new(72.0, 200.0);
        s.targets[0].vel = Vec2::new(-300.0, 30.0);
        tick(&mut s, &TickInput::default(), SIM_DT);
        assert!(s.targets[0].vel.x > 0.0);
        assert!(s.targets[0].pos.x >= 70.0);
    }

    #[test]
    fn test_next_round_spawns_after_delay() {
        let mut s = session(7);
        let target = s.targets[0].id;
        let shot = s.fire().expect("shot");
        s.resolve_hit(shot, target).expect("resolved");
        assert_eq!(s.phase(), SessionPhase::Resolving);

        let mut spawned = None;
        for _ in 0..55 {
            let ev = tick(&mut s, &TickInput::default(), SIM_DT);
            spawned = spawned.or(ev.spawned_round);
        }
        assert_eq!(spawned, None);
        assert!(s.targets().is_empty());

        for _ in 0..10 {
            let ev = tick(&mut s, &TickInput::default(), SIM_DT);
            spawned = spawned.or(ev.spawned_round);
        }
        assert_eq!(spawned, Some(1));
        assert_eq!(s.phase(), SessionPhase::AwaitingShot);
        assert_eq!(s.targets().len(), 4);
        assert_eq!(s.term_prompt(), "Match: \"REST\"");
    }

    #[test]
    fn test_two_overlaps_in_one_tick_resolve_once() {
        use std::cell::RefCell;
        use std::rc::Rc;

        let calls = Rc::new(RefCell::new(0));
        let sink = calls.clone();
        let pairs = vec![
            Pair::new("API", "a"),
            Pair::new("REST", "b"),
            Pair::new("JSON", "c"),
            Pair::new("HTTP", "d"),
        ];
        let mut s = Session::new(pairs, Settings::default(), 9, move |_| {
            *sink.borrow_mut() += 1;
        })
        .expect("valid session");

        let spots = [
            Vec2::new(150.0, 300.0),
            Vec2::new(400.0, 300.0),
            Vec2::new(650.0, 300.0),
            Vec2::new(400.0, 100.0),
        ];
        for (t, spot) in s.targets.iter_mut().zip(spots) {
            t.pos = spot;
            t.vel = Vec2::ZERO;
        }
        for spot in &spots[..2] {
            let id = s.next_entity_id();
            let now = s.now();
            assert!(s.projectiles.acquire(id, *spot, Vec2::ZERO, 6.0, now).is_some());
        }

        let events = tick(&mut s, &TickInput::default(), SIM_DT);
        assert!(events.resolved.is_some());
        assert_eq!(*calls.borrow(), 1);
        assert_eq!(s.round_index(), 1);
        assert!(s.targets().is_empty());
        assert_eq!(s.projectiles().active_count(), 1);

        // The surviving projectile has nothing left to hit
        let events = tick(&mut s, &TickInput::default(), SIM_DT);
        assert!(events.resolved.is_none());
        assert_eq!(*calls.borrow(), 1);
    }

    #[test]
    fn test_closed_session_is_inert() {
        let mut s = session(8);
        s.shutdown();
        let events = tick(
            &mut s,
            &TickInput {
                fire: true,
                ..Default::default()
            },
            SIM_DT,
        );
        assert_eq!(events, TickEvents::default());
    }
}
