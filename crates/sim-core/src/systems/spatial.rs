//! Spatial Helpers
//!
//! Nearest-entity search, stepping toward or away from points, wandering and
//! territory containment. Plain radius and rectangle checks only.

use rand::Rng;

use crate::components::{Position, Territory};

/// Keeps a point inside a `width` x `height` map anchored at the origin.
pub fn clamp_to_bounds(p: Position, width: f64, height: f64) -> Position {
    Position::new(p.x.clamp(0.0, width.max(0.0)), p.y.clamp(0.0, height.max(0.0)))
}

/// Moves at most `speed` toward `target`, stopping `stop_distance` short of it.
///
/// Never overshoots; returns `from` when already within the stop distance.
pub fn step_toward(from: Position, target: Position, speed: f64, stop_distance: f64) -> Position {
    let dist = from.distance_to(&target);
    if dist <= stop_distance || dist <= f64::EPSILON {
        return from;
    }
    let travel = speed.min(dist - stop_distance);
    Position::new(
        from.x + (target.x - from.x) / dist * travel,
        from.y + (target.y - from.y) / dist * travel,
    )
}

/// Moves `speed` directly away from `threat`; picks a random heading when the
/// two points coincide.
pub fn step_away<R: Rng>(from: Position, threat: Position, speed: f64, rng: &mut R) -> Position {
    let dist = from.distance_to(&threat);
    if dist <= f64::EPSILON {
        let angle = rng.gen_range(0.0..std::f64::consts::TAU);
        return Position::new(from.x + angle.cos() * speed, from.y + angle.sin() * speed);
    }
    Position::new(
        from.x + (from.x - threat.x) / dist * speed,
        from.y + (from.y - threat.y) / dist * speed,
    )
}

/// A random step of at most `speed / 2` on each axis.
pub fn wander_step<R: Rng>(from: Position, speed: f64, rng: &mut R) -> Position {
    let half = (speed / 2.0).max(0.0);
    if half <= 0.0 {
        return from;
    }
    Position::new(
        from.x + rng.gen_range(-half..=half),
        from.y + rng.gen_range(-half..=half),
    )
}

/// Mean of the given points.
pub fn centroid<I>(points: I) -> Option<Position>
where
    I: IntoIterator<Item = Position>,
{
    let (sum_x, sum_y, count) = points
        .into_iter()
        .fold((0.0, 0.0, 0usize), |(x, y, n), p| (x + p.x, y + p.y, n + 1));
    if count == 0 {
        None
    } else {
        Some(Position::new(sum_x / count as f64, sum_y / count as f64))
    }
}

/// The closest item to `origin` and its distance. The earliest item wins ties.
pub fn nearest<'a, T, I, F>(origin: Position, items: I, position_of: F) -> Option<(&'a T, f64)>
where
    I: IntoIterator<Item = &'a T>,
    F: Fn(&T) -> Position,
{
    let mut best: Option<(&'a T, f64)> = None;
    for item in items {
        let d = origin.distance_to(&position_of(item));
        if best.map_or(true, |(_, bd)| d < bd) {
            best = Some((item, d));
        }
    }
    best
}

/// Items within `radius` of `origin`, inclusive.
pub fn within_radius<'a, T, I, F>(origin: Position, radius: f64, items: I, position_of: F) -> Vec<&'a T>
where
    I: IntoIterator<Item = &'a T>,
    F: Fn(&T) -> Position,
{
    items
        .into_iter()
        .filter(|item| origin.distance_to(&position_of(item)) <= radius)
        .collect()
}

/// The first territory, in the order given, that contains the point.
pub fn territory_at<'a>(territories: &'a [Territory], p: &Position) -> Option<&'a Territory> {
    territories.iter().find(|t| t.contains(p))
}
