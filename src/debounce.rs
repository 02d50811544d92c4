//! Suppresses repeated actions while a recognised pose is held.
//!
//! The gate is label equality, not time: a held gesture fires once, and any
//! change of label (including passing through an unrecognised pose) re-arms it.

use crate::dispatch::ActionEvent;
use crate::gesture::GestureLabel;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DebounceState {
    /// Nothing latched; the next recognised gesture fires
    #[default]
    Idle,
    /// The last emitted gesture; it will not fire again until released
    Latched(GestureLabel),
}

#[derive(Debug, Default)]
pub struct Debouncer {
    state: DebounceState,
}

impl Debouncer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> DebounceState {
        self.state
    }

    /// Label of the last emitted action, `None` when idle
    pub fn last_emitted(&self) -> GestureLabel {
        match self.state {
            DebounceState::Idle => GestureLabel::None,
            DebounceState::Latched(label) => label,
        }
    }

    /// Feed the label classified for the current frame. Returns the event to
    /// dispatch, if any.
    pub fn update(&mut self, label: GestureLabel) -> Option<ActionEvent> {
        if self.state == DebounceState::Latched(label) {
            return None;
        }

        match ActionEvent::for_label(label) {
            Some(event) => {
                self.state = DebounceState::Latched(label);
                Some(event)
            }
            None => {
                self.state = DebounceState::Idle;
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fingers::FingerState;
    use crate::gesture::classify;

    fn feed(debouncer: &mut Debouncer, bits: [u8; 5]) -> Option<GestureLabel> {
        debouncer
            .update(classify(FingerState::from_bits(bits)))
            .map(|event| event.label)
    }

    #[test]
    fn test_initial_state_is_idle() {
        let debouncer = Debouncer::new();
        assert_eq!(debouncer.state(), DebounceState::Idle);
        assert_eq!(debouncer.last_emitted(), GestureLabel::None);
    }

    #[test]
    fn test_held_pose_fires_once() {
        let mut debouncer = Debouncer::new();

        assert_eq!(feed(&mut debouncer, [1, 1, 1, 1, 1]), Some(GestureLabel::PlayPause));
        for _ in 2..=10 {
            assert_eq!(feed(&mut debouncer, [1, 1, 1, 1, 1]), None);
        }
        assert_eq!(feed(&mut debouncer, [0, 1, 0, 0, 0]), Some(GestureLabel::Next));
        assert_eq!(debouncer.state(), DebounceState::Latched(GestureLabel::Next));
    }

    #[test]
    fn test_unmatched_pose_rearms() {
        let mut debouncer = Debouncer::new();

        assert_eq!(feed(&mut debouncer, [0, 1, 1, 0, 0]), Some(GestureLabel::VolumeUp));
        assert_eq!(feed(&mut debouncer, [1, 1, 0, 0, 1]), None);
        assert_eq!(debouncer.state(), DebounceState::Idle);
        assert_eq!(feed(&mut debouncer, [0, 1, 1, 0, 0]), Some(GestureLabel::VolumeUp));
    }

    #[test]
    fn test_no_hand_frames_stay_idle() {
        let mut debouncer = Debouncer::new();
        for _ in 0..5 {
            assert!(debouncer.update(GestureLabel::None).is_none());
            assert_eq!(debouncer.state(), DebounceState::Idle);
        }
    }

    #[test]
    fn test_direct_switch_between_gestures() {
        let mut debouncer = Debouncer::new();
        assert!(debouncer.update(GestureLabel::Mute).is_some());
        assert!(debouncer.update(GestureLabel::Previous).is_some());
        assert!(debouncer.update(GestureLabel::Mute).is_some());
        assert!(debouncer.update(GestureLabel::Mute).is_none());
    }

    #[test]
    fn test_emits_only_on_change_from_last_emitted() {
        const LABELS: [GestureLabel; 7] = [
            GestureLabel::PlayPause,
            GestureLabel::Next,
            GestureLabel::Previous,
            GestureLabel::Mute,
            GestureLabel::VolumeUp,
            GestureLabel::VolumeDown,
            GestureLabel::None,
        ];

        // Small LCG so the sequence is long and repeatable, biased towards repeats
        let mut seed: u32 = 0x2545_f491;
        let mut debouncer = Debouncer::new();
        let mut previous = GestureLabel::None;
        let mut emissions = 0;
        let mut runs = 0;

        for _ in 0..5_000 {
            seed = seed.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            let label = if (seed >> 28) < 10 {
                previous
            } else {
                LABELS[(seed >> 8) as usize % LABELS.len()]
            };

            let last = debouncer.last_emitted();
            let event = debouncer.update(label);

            let should_emit = !label.is_none() && label != last;
            assert_eq!(event.is_some(), should_emit);
            if let Some(event) = event {
                assert_eq!(event.label, label);
                emissions += 1;
            }
            if !label.is_none() && label != previous {
                runs += 1;
            }
            // State never holds a suppressed or unrecognised label
            assert_eq!(debouncer.last_emitted(), label);
            previous = label;
        }

        // One emission per contiguous run of a recognised label
        assert_eq!(emissions, runs);
    }
}
