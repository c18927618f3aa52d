//! Controller — owns the registry, the state machine and the watchdog.
//!
//! The controller is synchronous: every entry point takes the current time
//! and returns the messages to publish. The runtime serializes calls, so
//! message handling and the control tick never interleave.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::conf::{ControlConfig, RoverConfig};
use crate::fleet::{codec, shortest_angular_difference, FleetError, Pose, PoseRegistry};
use crate::flock::{self, Blend, FlockingWeights};
use crate::link::Message;
use super::mode::{ControllerState, Maneuver, ModeSignal};
use super::velocity::VelocityCommand;
use super::watchdog::Watchdog;

pub struct Controller {
    identity: String,
    registry: PoseRegistry,
    interaction_radius: f64,
    weights: FlockingWeights,
    gains: ControlConfig,
    state: ControllerState,
    /// Last raw mode value, reported on the state-machine channel.
    raw_mode: u8,
    own_pose: Pose,
    watchdog: Watchdog,
    transitions_to_auto: u32,
    first_autonomous_at: Option<DateTime<Utc>>,
    announced: bool,
    /// Identities already reported as overflowing the roster.
    rejected: HashSet<String>,
}

impl Controller {
    pub fn new(identity: String, config: &RoverConfig) -> Self {
        let mut registry = PoseRegistry::new(config.fleet_size);
        // own slot is claimed up front so peers can never crowd it out
        if let Err(e) = registry.upsert(&identity, 0.0, 0.0, 0.0) {
            warn!("Could not reserve own registry slot: {}", e);
        }

        Self {
            identity,
            registry,
            interaction_radius: config.flocking.interaction_radius,
            weights: config.flocking.weights(),
            gains: config.control.clone(),
            state: ControllerState::Manual,
            raw_mode: 0,
            own_pose: Pose::default(),
            watchdog: Watchdog::new(config.kill_switch_timeout()),
            transitions_to_auto: 0,
            first_autonomous_at: None,
            announced: false,
            rejected: HashSet::new(),
        }
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn registry(&self) -> &PoseRegistry {
        &self.registry
    }

    pub fn own_pose(&self) -> Pose {
        self.own_pose
    }

    pub fn transitions_to_auto(&self) -> u32 {
        self.transitions_to_auto
    }

    /// Wall-clock time of the first switch into autonomous mode.
    pub fn first_autonomous_at(&self) -> Option<DateTime<Utc>> {
        self.first_autonomous_at
    }

    pub fn watchdog_deadline(&self) -> Option<Instant> {
        self.watchdog.deadline()
    }

    // ── Inbound ─────────────────────────────────────────────────

    /// Apply one inbound message and return what must be published.
    pub fn handle(&mut self, message: Message, now: Instant) -> Vec<Message> {
        if let Some(rover) = message.rover() {
            if rover != self.identity {
                return Vec::new();
            }
        }

        match message {
            Message::Pose { text } => {
                // roster overflow is already logged by ingest_pose
                if let Err(e @ FleetError::MalformedMessage(_)) = self.ingest_pose(&text) {
                    debug!("Discarding pose broadcast: {}", e);
                }
                Vec::new()
            }
            Message::Mode { mode, .. } => vec![self.set_mode(mode, now)],
            Message::Joystick { linear, angular, .. } => {
                if self.state.is_manual() {
                    vec![self.set_velocity(VelocityCommand::new(linear, angular), now)]
                } else {
                    debug!("Ignoring joystick command while {}", self.state.as_str());
                    Vec::new()
                }
            }
            Message::Odometry { x, y, theta, .. } => {
                self.own_pose = Pose::new(x, y, theta);
                Vec::new()
            }
            // our own outputs echoed back by the transport
            Message::Announce { .. }
            | Message::Velocity { .. }
            | Message::Status { .. }
            | Message::StateMachine { .. }
            | Message::Diagnostic { .. } => Vec::new(),
        }
    }

    /// Decode a peer broadcast into the registry.
    ///
    /// Returns the slot index, or `None` for this rover's own broadcast.
    /// Roster overflow is logged once per identity and the identity dropped.
    pub fn ingest_pose(&mut self, text: &str) -> Result<Option<usize>, FleetError> {
        let decoded = codec::decode(text)?;
        if decoded.identity == self.identity {
            return Ok(None);
        }

        let pose = decoded.pose;
        match self.registry.upsert(&decoded.identity, pose.x, pose.y, pose.theta) {
            Ok(index) => Ok(Some(index)),
            Err(e) => {
                if self.rejected.insert(decoded.identity.clone()) {
                    warn!("{}; check fleet_size (currently {})", e, self.registry.size());
                } else {
                    debug!("{}", e);
                }
                Err(e)
            }
        }
    }

    fn set_mode(&mut self, raw: u8, now: Instant) -> Message {
        self.raw_mode = raw;
        let signal = ModeSignal::from_raw(raw).unwrap_or_else(|| {
            warn!("Unknown mode value {}, treating as manual", raw);
            ModeSignal::Manual
        });

        let next = match (signal, self.state) {
            (ModeSignal::Manual, _) => ControllerState::Manual,
            (ModeSignal::Autonomous, ControllerState::Manual) => ControllerState::AutonomousEngaging,
            (ModeSignal::Autonomous, current) => current,
        };
        if next != self.state {
            info!(from = self.state.as_str(), to = next.as_str(), mode = raw, "Mode change");
            self.state = next;
        }

        self.set_velocity(VelocityCommand::zero(), now)
    }

    // ── Periodic ────────────────────────────────────────────────

    /// One control tick.
    pub fn tick(&mut self, now: Instant) -> Vec<Message> {
        let pose = self.own_pose;
        let self_index = self.registry.upsert(&self.identity, pose.x, pose.y, pose.theta).ok();
        let blend = self_index.and_then(|index| {
            let neighbors = flock::neighbors_of(index, &self.registry, self.interaction_radius);
            flock::blend(index, &self.registry, &neighbors, &self.weights)
        });
        let heading = blend.map_or(pose.theta, |b| b.heading);

        let mut out = Vec::with_capacity(5);

        if self.state == ControllerState::AutonomousEngaging {
            self.transitions_to_auto += 1;
            if self.first_autonomous_at.is_none() {
                let stamp = Utc::now();
                info!(at = %stamp, "First transition to autonomous mode");
                self.first_autonomous_at = Some(stamp);
            }
            self.state = ControllerState::Autonomous(Maneuver::Translate);
        }

        let state_text = match self.state {
            ControllerState::Autonomous(maneuver) => {
                let command = self.maneuver_command(maneuver, heading);
                out.push(self.set_velocity(command, now));
                maneuver.label().to_string()
            }
            _ => format!("WAITING, CURRENT MODE: {}", self.raw_mode),
        };

        out.push(Message::StateMachine { rover: self.identity.clone(), text: state_text });
        out.push(Message::Pose { text: codec::encode(&self.identity, &pose) });
        out.extend(self.diagnostics(blend, heading));
        out
    }

    fn maneuver_command(&self, maneuver: Maneuver, heading: f64) -> VelocityCommand {
        match maneuver {
            Maneuver::Translate => {
                let error = shortest_angular_difference(heading, self.own_pose.theta);
                VelocityCommand::new(self.gains.cruise_speed, self.gains.k_p * error)
            }
        }
    }

    fn diagnostics(&self, blend: Option<Blend>, heading: f64) -> Vec<Message> {
        let global = match flock::global_average_heading(&self.registry) {
            Some(theta) => format!("Global Average Theta = {:.4}", theta),
            None => "Global Average Theta = undefined".to_string(),
        };
        let neighbors = blend.map_or(0, |b| b.neighbor_count);
        let local = format!(
            "{} with {} neighbors with Combine Theta = {:.4}",
            self.identity, neighbors, heading
        );
        debug!(
            neighbors,
            heading,
            registered = self.registry.registered(),
            local_average = ?blend.and_then(|b| b.local_average),
            "Flock blend"
        );

        vec![
            Message::Diagnostic { rover: self.identity.clone(), text: global },
            Message::Diagnostic { rover: self.identity.clone(), text: local },
        ]
    }

    /// Liveness: announce once, then report online.
    pub fn status(&mut self) -> Vec<Message> {
        let mut out = Vec::with_capacity(2);
        if !self.announced {
            out.push(Message::Announce { text: format!("I {}", self.identity) });
            self.announced = true;
        }
        out.push(Message::Status { rover: self.identity.clone(), text: "online".to_string() });
        out
    }

    // ── Safety ──────────────────────────────────────────────────

    /// Zero command if the kill-switch deadline has passed. Does not re-arm.
    pub fn expire_watchdog(&mut self, now: Instant) -> Option<Message> {
        if !self.watchdog.expire(now) {
            return None;
        }
        warn!(
            "Movement input timeout after {:?}, stopping the rover",
            self.watchdog.timeout()
        );
        Some(self.velocity_message(VelocityCommand::zero()))
    }

    /// Final stop issued at shutdown.
    pub fn stop(&self) -> Message {
        info!(watchdog_armed = self.watchdog.is_armed(), "Issuing final stop");
        self.velocity_message(VelocityCommand::zero())
    }

    /// Every velocity-setting event goes through here and re-arms the watchdog.
    fn set_velocity(&mut self, command: VelocityCommand, now: Instant) -> Message {
        debug!(
            linear = command.linear,
            angular = command.angular,
            stop = command.is_zero(),
            "Velocity command"
        );
        self.watchdog.arm_or_retrigger(now);
        self.velocity_message(command)
    }

    fn velocity_message(&self, command: VelocityCommand) -> Message {
        let scaled = command.scaled(self.gains.linear_scale, self.gains.angular_scale);
        Message::Velocity {
            rover: self.identity.clone(),
            linear: scaled.linear,
            angular: scaled.angular,
        }
    }
}
