//! Neighbors — proximity graph over the pose registry.

use crate::fleet::PoseRegistry;

/// A peer within interaction range of the reference slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub index: usize,
    pub distance: f64,
    /// Peer minus self, x component
    pub dx: f64,
    /// Peer minus self, y component
    pub dy: f64,
}

/// Every claimed slot other than `self_index` whose distance to it is at
/// most `radius`, in slot order.
///
/// Returns an empty list when `self_index` is not a claimed slot.
pub fn neighbors_of(self_index: usize, registry: &PoseRegistry, radius: f64) -> Vec<Neighbor> {
    let Some(me) = registry.get(self_index) else {
        return Vec::new();
    };

    registry
        .iter()
        .filter(|(index, _)| *index != self_index)
        .filter_map(|(index, peer)| {
            let dx = peer.pose.x - me.pose.x;
            let dy = peer.pose.y - me.pose.y;
            let distance = dx.hypot(dy);
            (distance <= radius).then_some(Neighbor { index, distance, dx, dy })
        })
        .collect()
}
