//! Registry — fixed-capacity table of the latest pose per fleet member.
//!
//! Slots are claimed in first-seen order and never released. A slot's
//! identity is fixed once claimed; only its pose is overwritten.

use tracing::debug;

use super::pose::{AgentPose, Pose};
use super::{FleetError, Result};

pub struct PoseRegistry {
    slots: Vec<Option<AgentPose>>,
}

impl PoseRegistry {
    /// Create a registry for a fleet of `capacity` rovers.
    pub fn new(capacity: usize) -> Self {
        Self { slots: vec![None; capacity] }
    }

    /// Record the latest pose for `identity`, claiming the first empty slot
    /// if the identity has not been seen before.
    ///
    /// Returns the slot index, or `RosterFull` when every slot belongs to
    /// another identity. A failed upsert leaves the registry untouched.
    pub fn upsert(&mut self, identity: &str, x: f64, y: f64, theta: f64) -> Result<usize> {
        let pose = Pose::new(x, y, theta);

        if let Some(index) = self.index_of(identity) {
            if let Some(slot) = self.slots[index].as_mut() {
                slot.pose = pose;
            }
            return Ok(index);
        }

        match self.slots.iter().position(Option::is_none) {
            Some(index) => {
                debug!(identity, index, "Registered new fleet member");
                self.slots[index] = Some(AgentPose {
                    identity: identity.to_string(),
                    pose,
                });
                Ok(index)
            }
            None => Err(FleetError::RosterFull {
                identity: identity.to_string(),
                capacity: self.slots.len(),
            }),
        }
    }

    pub fn get(&self, index: usize) -> Option<&AgentPose> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    pub fn index_of(&self, identity: &str) -> Option<usize> {
        self.slots.iter().position(|slot| {
            slot.as_ref().is_some_and(|agent| agent.identity == identity)
        })
    }

    /// Configured fleet size (capacity), not the number of claimed slots.
    pub fn size(&self) -> usize {
        self.slots.len()
    }

    pub fn registered(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Claimed slots with their indices, in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &AgentPose)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_ref().map(|agent| (index, agent)))
    }
}
