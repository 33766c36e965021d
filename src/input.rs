//! External input slots: hand tracking and audio analysis.
//!
//! Producers (a camera-frame hand tracker, an audio analyser) run at their own
//! rates and write into latest-value slots here; the engine reads the newest
//! value each frame. Staleness is acceptable, queues are not needed.
//! Disabling a source synchronously zeroes its contribution so no stale force
//! keeps acting.

use glam::{Vec3, Vec4};

/// Discrete hand gesture, as classified by the external tracker.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Gesture {
    #[default]
    None,
    Open,
    Closed,
    Pinch,
    Point,
    Peace,
}

impl Gesture {
    pub fn index(self) -> u32 {
        match self {
            Gesture::None => 0,
            Gesture::Open => 1,
            Gesture::Closed => 2,
            Gesture::Pinch => 3,
            Gesture::Point => 4,
            Gesture::Peace => 5,
        }
    }

    pub fn from_index(i: u32) -> Gesture {
        match i {
            1 => Gesture::Open,
            2 => Gesture::Closed,
            3 => Gesture::Pinch,
            4 => Gesture::Point,
            5 => Gesture::Peace,
            _ => Gesture::None,
        }
    }
}

/// Latest state for one hand.
#[derive(Clone, Copy, Debug, Default)]
pub struct HandState {
    /// World-space position; `None` when the hand is not tracked.
    pub position: Option<Vec3>,
    pub gesture: Gesture,
}

impl HandState {
    /// Encode for the uniform block: xyz position, w gesture id. An absent
    /// hand is the near-zero sentinel vector.
    pub fn encoded(&self) -> Vec4 {
        match self.position {
            Some(p) => p.extend(self.gesture.index() as f32),
            None => Vec4::ZERO,
        }
    }
}

/// Latest-value slots for both hands.
#[derive(Clone, Copy, Debug)]
pub struct HandTracker {
    pub left: HandState,
    pub right: HandState,
    enabled: bool,
}

impl Default for HandTracker {
    fn default() -> Self {
        Self {
            left: HandState::default(),
            right: HandState::default(),
            enabled: true,
        }
    }
}

impl HandTracker {
    pub fn set_left(&mut self, position: Option<Vec3>, gesture: Gesture) {
        self.left = HandState { position, gesture };
    }

    pub fn set_right(&mut self, position: Option<Vec3>, gesture: Gesture) {
        self.right = HandState { position, gesture };
    }

    /// Disabling zeroes both hands immediately; re-enabling starts from
    /// whatever the producer writes next.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.left = HandState::default();
            self.right = HandState::default();
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Both hands encoded for the uniform block.
    pub fn encoded(&self) -> [Vec4; 2] {
        if self.enabled {
            [self.left.encoded(), self.right.encoded()]
        } else {
            [Vec4::ZERO, Vec4::ZERO]
        }
    }
}

/// Smoothed audio band energies, each in [0, 1].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AudioBands {
    pub bass: f32,
    pub mid: f32,
    pub treble: f32,
    pub energy: f32,
}

impl AudioBands {
    pub fn to_array(self) -> [f32; 4] {
        [self.bass, self.mid, self.treble, self.energy]
    }
}

/// Latest-value slot for the audio analyser.
#[derive(Clone, Copy, Debug)]
pub struct AudioInput {
    bands: AudioBands,
    enabled: bool,
}

impl Default for AudioInput {
    fn default() -> Self {
        Self {
            bands: AudioBands::default(),
            enabled: true,
        }
    }
}

impl AudioInput {
    /// Write the newest analysis, clamped to the contract range.
    pub fn set(&mut self, bands: AudioBands) {
        self.bands = AudioBands {
            bass: bands.bass.clamp(0.0, 1.0),
            mid: bands.mid.clamp(0.0, 1.0),
            treble: bands.treble.clamp(0.0, 1.0),
            energy: bands.energy.clamp(0.0, 1.0),
        };
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.bands = AudioBands::default();
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn bands(&self) -> AudioBands {
        if self.enabled {
            self.bands
        } else {
            AudioBands::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_hand_encodes_to_sentinel() {
        let hand = HandState {
            position: None,
            gesture: Gesture::Open,
        };
        assert_eq!(hand.encoded(), Vec4::ZERO);
    }

    #[test]
    fn disable_zeroes_hands_synchronously() {
        let mut tracker = HandTracker::default();
        tracker.set_left(Some(Vec3::new(1.0, 2.0, 3.0)), Gesture::Pinch);
        assert_ne!(tracker.encoded()[0], Vec4::ZERO);
        tracker.set_enabled(false);
        assert_eq!(tracker.encoded(), [Vec4::ZERO, Vec4::ZERO]);
    }

    #[test]
    fn newest_hand_value_wins() {
        let mut tracker = HandTracker::default();
        tracker.set_right(Some(Vec3::X), Gesture::Open);
        tracker.set_right(Some(Vec3::Y * 5.0), Gesture::Closed);
        let encoded = tracker.encoded()[1];
        assert_eq!(encoded.truncate(), Vec3::Y * 5.0);
        assert_eq!(encoded.w as u32, Gesture::Closed.index());
    }

    #[test]
    fn audio_clamps_and_zeroes_on_disable() {
        let mut audio = AudioInput::default();
        audio.set(AudioBands {
            bass: 1.7,
            mid: -0.3,
            treble: 0.5,
            energy: 0.9,
        });
        let bands = audio.bands();
        assert_eq!(bands.bass, 1.0);
        assert_eq!(bands.mid, 0.0);
        audio.set_enabled(false);
        assert_eq!(audio.bands(), AudioBands::default());
    }

    #[test]
    fn gesture_round_trip() {
        for g in [
            Gesture::None,
            Gesture::Open,
            Gesture::Closed,
            Gesture::Pinch,
            Gesture::Point,
            Gesture::Peace,
        ] {
            assert_eq!(Gesture::from_index(g.index()), g);
        }
    }
}
