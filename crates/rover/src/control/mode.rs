//! Mode — operator mode signal and the controller state machine states.

/// Operator mode as delivered by the mode collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeSignal {
    Manual,
    Autonomous,
}

impl ModeSignal {
    /// 0 and 1 are manual; 2 and 3 are the two upstream autonomous
    /// variants. Anything else is `None`.
    pub fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            0 | 1 => Some(ModeSignal::Manual),
            2 | 3 => Some(ModeSignal::Autonomous),
            _ => None,
        }
    }
}

/// Maneuvers available while autonomous.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Maneuver {
    /// Cruise forward while steering toward the commanded heading.
    Translate,
}

impl Maneuver {
    /// Label published on the state-machine channel.
    pub fn label(&self) -> &'static str {
        match self {
            Maneuver::Translate => "TRANSLATING",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Manual,
    /// Autonomous mode requested; the next tick completes the transition.
    AutonomousEngaging,
    Autonomous(Maneuver),
}

impl ControllerState {
    pub fn is_manual(&self) -> bool {
        matches!(self, ControllerState::Manual)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ControllerState::Manual => "manual",
            ControllerState::AutonomousEngaging => "autonomous_engaging",
            ControllerState::Autonomous(_) => "autonomous",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_signal_mapping() {
        assert_eq!(ModeSignal::from_raw(0), Some(ModeSignal::Manual));
        assert_eq!(ModeSignal::from_raw(1), Some(ModeSignal::Manual));
        assert_eq!(ModeSignal::from_raw(2), Some(ModeSignal::Autonomous));
        assert_eq!(ModeSignal::from_raw(3), Some(ModeSignal::Autonomous));
        assert_eq!(ModeSignal::from_raw(4), None);
    }

    #[test]
    fn test_translate_label() {
        assert_eq!(Maneuver::Translate.label(), "TRANSLATING");
    }

    #[test]
    fn test_state_names() {
        assert!(ControllerState::Manual.is_manual());
        assert!(!ControllerState::Autonomous(Maneuver::Translate).is_manual());
        assert_eq!(ControllerState::AutonomousEngaging.as_str(), "autonomous_engaging");
    }
}
