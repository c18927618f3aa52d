//! Blend — alignment, cohesion and separation combined into one heading.

use crate::fleet::{wrap_angle, PoseRegistry};
use super::neighbors::Neighbor;

/// Steering weights for the three flocking terms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlockingWeights {
    /// Radius inside which a neighbor contributes to separation.
    pub separation_distance: f64,
    pub separation_weight: f64,
    pub cohesion_weight: f64,
    pub alignment_weight: f64,
}

impl Default for FlockingWeights {
    fn default() -> Self {
        Self {
            separation_distance: 1.0,
            separation_weight: 0.5,
            cohesion_weight: 0.0,
            alignment_weight: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
struct Vec2 {
    x: f64,
    y: f64,
}

impl Vec2 {
    fn norm(self) -> f64 {
        self.x.hypot(self.y)
    }

    fn add(self, other: Vec2) -> Vec2 {
        Vec2 { x: self.x + other.x, y: self.y + other.y }
    }

    /// Unit vector scaled by `weight`, or zero when the vector is zero.
    fn weighted(self, weight: f64) -> Vec2 {
        let norm = self.norm();
        if norm == 0.0 {
            return Vec2::default();
        }
        Vec2 { x: self.x / norm * weight, y: self.y / norm * weight }
    }

    fn neg(self) -> Vec2 {
        Vec2 { x: -self.x, y: -self.y }
    }
}

/// Result of one blend, including the diagnostic-only local average.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Blend {
    /// Commanded heading in (-π, π].
    pub heading: f64,
    pub neighbor_count: usize,
    /// Mean heading of self and neighbors; `None` when there are no neighbors.
    pub local_average: Option<f64>,
    /// True when every term vanished and the heading fell back to self's.
    pub degenerate: bool,
}

/// Blend the flocking terms for the rover in `self_index`.
///
/// Returns `None` only when `self_index` is not a claimed slot.
pub fn blend(
    self_index: usize,
    registry: &PoseRegistry,
    neighbors: &[Neighbor],
    weights: &FlockingWeights,
) -> Option<Blend> {
    let me = registry.get(self_index)?;
    let (own_x, own_y) = me.pose.heading_unit();

    let mut alignment = Vec2 { x: own_x, y: own_y };
    let mut cohesion = Vec2::default();
    let mut separation = Vec2::default();

    for neighbor in neighbors {
        if let Some(peer) = registry.get(neighbor.index) {
            let (hx, hy) = peer.pose.heading_unit();
            alignment = alignment.add(Vec2 { x: hx, y: hy });
        }
        // cohesion accumulates self minus peer, separation peer minus self;
        // both get negated below
        cohesion = cohesion.add(Vec2 { x: -neighbor.dx, y: -neighbor.dy });
        if neighbor.distance <= weights.separation_distance {
            separation = separation.add(Vec2 { x: neighbor.dx, y: neighbor.dy });
        }
    }

    let members = (neighbors.len() + 1) as f64;
    alignment = Vec2 { x: alignment.x / members, y: alignment.y / members };

    let local_average = (!neighbors.is_empty()).then(|| alignment.y.atan2(alignment.x));

    let total = alignment
        .weighted(weights.alignment_weight)
        .add(cohesion.weighted(weights.cohesion_weight).neg())
        .add(separation.weighted(weights.separation_weight).neg());

    let degenerate = total.norm() == 0.0;
    let heading = if degenerate {
        me.pose.theta
    } else {
        wrap_angle(total.y.atan2(total.x))
    };

    Some(Blend {
        heading,
        neighbor_count: neighbors.len(),
        local_average,
        degenerate,
    })
}

/// Mean heading over every registered slot, or `None` when the mean
/// unit vector vanishes.
pub fn global_average_heading(registry: &PoseRegistry) -> Option<f64> {
    let (sum, count) = registry.iter().fold((Vec2::default(), 0usize), |(sum, count), (_, agent)| {
        let (x, y) = agent.pose.heading_unit();
        (sum.add(Vec2 { x, y }), count + 1)
    });
    if count == 0 || sum.norm() == 0.0 {
        return None;
    }
    Some(sum.y.atan2(sum.x))
}
