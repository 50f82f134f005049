//! Headless path follower
//!
//! В игре `NavAgent` исполняет engine (NavigationAgent + CharacterBody).
//! Для headless прогонов и тестов — упрощённый follower: прямая к destination,
//! шаг принимается только если остаётся на walkable поверхности без перепада
//! высоты (обрывы/уступы пешком не проходятся).

use bevy::prelude::*;

use super::{flatten, WorldNavigation, WorldView};
use crate::ai::MonsterSet;
use crate::components::{MotionAuthority, NavAgent};

/// Максимальный перепад высоты за один шаг (ступенька)
const MAX_STEP_HEIGHT: f32 = 0.5;

pub struct HeadlessNavigationPlugin;

impl Plugin for HeadlessNavigationPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(FixedUpdate, follow_navigation_paths.after(MonsterSet));
    }
}

/// Система: двигает агентов с `MotionAuthority::Navigated` к их destination
pub fn follow_navigation_paths(
    mut agents: Query<(&mut Transform, &mut NavAgent, &MotionAuthority)>,
    navigation: Option<Res<WorldNavigation>>,
    time: Res<Time<Fixed>>,
) {
    let delta = time.delta_secs();
    let view = WorldView::new(navigation.as_deref(), None);

    for (mut transform, mut agent, authority) in agents.iter_mut() {
        if *authority != MotionAuthority::Navigated || !agent.enabled {
            continue;
        }

        let Some(destination) = agent.destination else {
            continue;
        };

        let position = transform.translation;
        let to_destination = flatten(destination - position);
        let distance = to_destination.length();
        agent.remaining_distance = distance;

        if agent.is_stopped || distance <= agent.stopping_distance || distance < f32::EPSILON {
            continue;
        }

        let direction = to_destination / distance;
        let step = (agent.speed * delta).min(distance);
        let mut next = position + direction * step;

        if view.has_navigation() {
            match view.sample_walkable(next, MAX_STEP_HEIGHT) {
                Some(ground) if (ground.y - position.y).abs() <= MAX_STEP_HEIGHT => next = ground,
                // Край mesh'а / уступ — стоим
                _ => continue,
            }
        }

        transform.translation = next;
        transform.look_to(direction, Vec3::Y);
        agent.remaining_distance = flatten(destination - next).length();
    }
}
