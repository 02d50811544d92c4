use crate::fingers::FingerState;

/// Control gestures recognised from a finger state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum GestureLabel {
    PlayPause,
    Next,
    Previous,
    Mute,
    VolumeUp,
    VolumeDown,
    /// The finger state is not in the gesture table
    #[default]
    None,
}

impl GestureLabel {
    pub fn is_none(&self) -> bool {
        *self == Self::None
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PlayPause => "play-pause",
            Self::Next => "next",
            Self::Previous => "previous",
            Self::Mute => "mute",
            Self::VolumeUp => "volume-up",
            Self::VolumeDown => "volume-down",
            Self::None => "none",
        }
    }

    /// Human-readable action name shown in the preview
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::PlayPause => "Play/Pause",
            Self::Next => "Next Track",
            Self::Previous => "Previous Track",
            Self::Mute => "Mute",
            Self::VolumeUp => "Volume Up",
            Self::VolumeDown => "Volume Down",
            Self::None => "",
        }
    }

    /// How to form the gesture
    pub fn pose_hint(&self) -> &'static str {
        match self {
            Self::PlayPause => "All fingers up",
            Self::Next => "Index finger up",
            Self::Previous => "Pinky finger up",
            Self::Mute => "Fist",
            Self::VolumeUp => "Index + Middle up",
            Self::VolumeDown => "Index + Middle + Ring up",
            Self::None => "",
        }
    }
}

/// Exact-match lookup table, thumb first
pub const GESTURE_TABLE: [(FingerState, GestureLabel); 6] = [
    (FingerState::from_bits([1, 1, 1, 1, 1]), GestureLabel::PlayPause),
    (FingerState::from_bits([0, 1, 0, 0, 0]), GestureLabel::Next),
    (FingerState::from_bits([0, 0, 0, 0, 1]), GestureLabel::Previous),
    (FingerState::from_bits([0, 0, 0, 0, 0]), GestureLabel::Mute),
    (FingerState::from_bits([0, 1, 1, 0, 0]), GestureLabel::VolumeUp),
    (FingerState::from_bits([0, 1, 1, 1, 0]), GestureLabel::VolumeDown),
];

pub fn classify(state: FingerState) -> GestureLabel {
    GESTURE_TABLE
        .iter()
        .find(|(pattern, _)| *pattern == state)
        .map(|&(_, label)| label)
        .unwrap_or(GestureLabel::None)
}
