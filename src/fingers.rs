use std::fmt;

use crate::landmarks::{index, LandmarkSet};
use crate::FINGER_COUNT;

/// Extended/flexed flags in fixed order: thumb, index, middle, ring, pinky.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct FingerState([bool; FINGER_COUNT]);

impl FingerState {
    pub const fn new(extended: [bool; FINGER_COUNT]) -> Self {
        Self(extended)
    }

    /// Build from 0/1 digits, e.g. `from_bits([0, 1, 1, 0, 0])`
    pub const fn from_bits(bits: [u8; FINGER_COUNT]) -> Self {
        Self([bits[0] != 0, bits[1] != 0, bits[2] != 0, bits[3] != 0, bits[4] != 0])
    }

    pub fn as_array(&self) -> [bool; FINGER_COUNT] {
        self.0
    }

    pub fn thumb(&self) -> bool {
        self.0[0]
    }

    pub fn extended_count(&self) -> usize {
        self.0.iter().filter(|&&up| up).count()
    }
}

impl fmt::Display for FingerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits: Vec<&str> = self.0.iter().map(|&up| if up { "1" } else { "0" }).collect();
        write!(f, "({})", digits.join(","))
    }
}

// (tip, reference joint) per finger
const FINGER_JOINTS: [(usize, usize); FINGER_COUNT] = [
    (index::THUMB_TIP, index::THUMB_IP),
    (index::INDEX_TIP, index::INDEX_PIP),
    (index::MIDDLE_TIP, index::MIDDLE_PIP),
    (index::RING_TIP, index::RING_PIP),
    (index::PINKY_TIP, index::PINKY_PIP),
];

/// Derive the finger state of one hand from its keypoints.
///
/// The thumb counts as extended when its tip lies left of the IP joint in the
/// mirrored frame, i.e. pointing away from the palm. The other fingers are
/// extended when the tip sits above the PIP joint (image y grows downward).
pub fn extract(hand: &LandmarkSet) -> FingerState {
    let mut extended = [false; FINGER_COUNT];

    for (finger, &(tip, joint)) in FINGER_JOINTS.iter().enumerate() {
        let tip = hand.point(tip);
        let joint = hand.point(joint);
        extended[finger] = if finger == 0 {
            tip.x < joint.x
        } else {
            tip.y < joint.y
        };
    }

    FingerState(extended)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::Landmark;

    fn hand(state: [u8; 5]) -> LandmarkSet {
        let mut points = [Landmark::new(0.5, 0.5); 21];
        points[index::THUMB_IP] = Landmark::new(0.4, 0.6);
        points[index::THUMB_TIP] = if state[0] == 1 {
            Landmark::new(0.3, 0.6)
        } else {
            Landmark::new(0.45, 0.6)
        };
        for (finger, &(tip, pip)) in FINGER_JOINTS.iter().enumerate().skip(1) {
            points[pip] = Landmark::new(0.5, 0.4);
            points[tip] = if state[finger] == 1 {
                Landmark::new(0.5, 0.2)
            } else {
                Landmark::new(0.5, 0.5)
            };
        }
        LandmarkSet::new(points)
    }

    #[test]
    fn test_open_palm() {
        assert_eq!(extract(&hand([1, 1, 1, 1, 1])), FingerState::from_bits([1, 1, 1, 1, 1]));
    }

    #[test]
    fn test_fist() {
        let state = extract(&hand([0, 0, 0, 0, 0]));
        assert_eq!(state, FingerState::default());
        assert_eq!(state.extended_count(), 0);
    }

    #[test]
    fn test_each_finger_independent() {
        for finger in 0..5 {
            let mut bits = [0u8; 5];
            bits[finger] = 1;
            let state = extract(&hand(bits));
            assert_eq!(state, FingerState::from_bits(bits), "finger {finger}");
        }
    }

    #[test]
    fn test_thumb_uses_x_only() {
        // Thumb tip higher than the joint but to its right: still flexed
        let mut points = *hand([0, 0, 0, 0, 0]).points();
        points[index::THUMB_TIP] = Landmark::new(0.45, 0.1);
        assert!(!extract(&LandmarkSet::new(points)).thumb());
    }

    #[test]
    fn test_equal_coordinates_count_as_flexed() {
        let points = [Landmark::new(0.5, 0.5); 21];
        assert_eq!(extract(&LandmarkSet::new(points)), FingerState::default());
    }

    #[test]
    fn test_display() {
        assert_eq!(FingerState::from_bits([0, 1, 1, 0, 0]).to_string(), "(0,1,1,0,0)");
    }
}
