use enigo::{Direction, Enigo, Key, Keyboard, Settings};
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::config::DispatchConfig;
use crate::gesture::GestureLabel;

/// OS media keys the controller can press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKey {
    PlayPause,
    NextTrack,
    PreviousTrack,
    Mute,
    VolumeUp,
    VolumeDown,
}

impl MediaKey {
    pub fn for_label(label: GestureLabel) -> Option<Self> {
        match label {
            GestureLabel::PlayPause => Some(Self::PlayPause),
            GestureLabel::Next => Some(Self::NextTrack),
            GestureLabel::Previous => Some(Self::PreviousTrack),
            GestureLabel::Mute => Some(Self::Mute),
            GestureLabel::VolumeUp => Some(Self::VolumeUp),
            GestureLabel::VolumeDown => Some(Self::VolumeDown),
            GestureLabel::None => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PlayPause => "playpause",
            Self::NextTrack => "nexttrack",
            Self::PreviousTrack => "prevtrack",
            Self::Mute => "volumemute",
            Self::VolumeUp => "volumeup",
            Self::VolumeDown => "volumedown",
        }
    }

    pub fn is_volume_step(&self) -> bool {
        matches!(self, Self::VolumeUp | Self::VolumeDown)
    }
}

/// A recognised gesture paired with the key it triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionEvent {
    pub label: GestureLabel,
    pub key: MediaKey,
}

impl ActionEvent {
    /// `None` for the unrecognised label, which never triggers anything
    pub fn for_label(label: GestureLabel) -> Option<Self> {
        MediaKey::for_label(label).map(|key| Self { label, key })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// The injection backend refused the key press
    #[error("key injection blocked: {0}")]
    InjectionBlocked(String),

    #[error("key injection unavailable: {0}")]
    Unavailable(String),
}

/// Backend that turns a logical media key into an OS key press
pub trait KeySender {
    fn send_key(&mut self, key: MediaKey) -> Result<(), DispatchError>;

    fn name(&self) -> &str;
}

/// Injects media keys through enigo
pub struct EnigoKeySender {
    enigo: Enigo,
}

impl EnigoKeySender {
    pub fn new() -> Result<Self, DispatchError> {
        let enigo = Enigo::new(&Settings::default())
            .map_err(|e| DispatchError::Unavailable(format!("failed to init enigo: {e}")))?;
        Ok(Self { enigo })
    }

    fn enigo_key(key: MediaKey) -> Key {
        match key {
            MediaKey::PlayPause => Key::MediaPlayPause,
            MediaKey::NextTrack => Key::MediaNextTrack,
            MediaKey::PreviousTrack => Key::MediaPrevTrack,
            MediaKey::Mute => Key::VolumeMute,
            MediaKey::VolumeUp => Key::VolumeUp,
            MediaKey::VolumeDown => Key::VolumeDown,
        }
    }
}

impl KeySender for EnigoKeySender {
    fn send_key(&mut self, key: MediaKey) -> Result<(), DispatchError> {
        self.enigo
            .key(Self::enigo_key(key), Direction::Click)
            .map_err(|e| DispatchError::InjectionBlocked(e.to_string()))
    }

    fn name(&self) -> &str {
        "enigo"
    }
}

/// Logs key presses instead of injecting them (`--dry-run`)
#[derive(Debug, Default)]
pub struct LogKeySender;

impl KeySender for LogKeySender {
    fn send_key(&mut self, key: MediaKey) -> Result<(), DispatchError> {
        info!("dry run: would press {}", key.as_str());
        Ok(())
    }

    fn name(&self) -> &str {
        "dry-run"
    }
}

/// Sends one key per action event and paces successive presses.
///
/// After a successful press the dispatcher stays closed for a short pause
/// (longer for transport keys than for volume steps). Callers check
/// [`Dispatcher::is_ready`] instead of sleeping.
pub struct Dispatcher {
    sender: Box<dyn KeySender>,
    pause: Duration,
    volume_pause: Duration,
    resume_at: Option<Instant>,
}

impl Dispatcher {
    pub fn new(sender: Box<dyn KeySender>, config: &DispatchConfig) -> Self {
        Self {
            sender,
            pause: Duration::from_millis(config.pause_ms),
            volume_pause: Duration::from_millis(config.volume_pause_ms),
            resume_at: None,
        }
    }

    pub fn is_ready(&self, now: Instant) -> bool {
        self.resume_at.map_or(true, |t| now >= t)
    }

    pub fn dispatch(&mut self, event: &ActionEvent, now: Instant) -> Result<(), DispatchError> {
        self.sender.send_key(event.key)?;

        let pause = if event.key.is_volume_step() {
            self.volume_pause
        } else {
            self.pause
        };
        self.resume_at = Some(now + pause);
        debug!(
            "{} sent {}, paused for {:?}",
            self.sender.name(),
            event.key.as_str(),
            pause
        );
        Ok(())
    }

    pub fn backend(&self) -> &str {
        self.sender.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    struct RecordingSender {
        pressed: Arc<Mutex<Vec<MediaKey>>>,
        blocked: bool,
    }

    impl KeySender for RecordingSender {
        fn send_key(&mut self, key: MediaKey) -> Result<(), DispatchError> {
            if self.blocked {
                return Err(DispatchError::InjectionBlocked("fail-safe".into()));
            }
            self.pressed.lock().unwrap().push(key);
            Ok(())
        }

        fn name(&self) -> &str {
            "recording"
        }
    }

    fn dispatcher(blocked: bool) -> (Dispatcher, Arc<Mutex<Vec<MediaKey>>>) {
        let pressed = Arc::new(Mutex::new(Vec::new()));
        let sender = RecordingSender {
            pressed: Arc::clone(&pressed),
            blocked,
        };
        (
            Dispatcher::new(Box::new(sender), &DispatchConfig::default()),
            pressed,
        )
    }

    #[test]
    fn test_label_to_key_mapping() {
        assert_eq!(MediaKey::for_label(GestureLabel::PlayPause), Some(MediaKey::PlayPause));
        assert_eq!(MediaKey::for_label(GestureLabel::Next), Some(MediaKey::NextTrack));
        assert_eq!(MediaKey::for_label(GestureLabel::Previous), Some(MediaKey::PreviousTrack));
        assert_eq!(MediaKey::for_label(GestureLabel::Mute), Some(MediaKey::Mute));
        assert_eq!(MediaKey::for_label(GestureLabel::VolumeUp), Some(MediaKey::VolumeUp));
        assert_eq!(MediaKey::for_label(GestureLabel::VolumeDown), Some(MediaKey::VolumeDown));
        assert_eq!(MediaKey::for_label(GestureLabel::None), None);
        assert!(ActionEvent::for_label(GestureLabel::None).is_none());
    }

    #[test]
    fn test_dispatch_sends_exactly_one_key() {
        let (mut dispatcher, pressed) = dispatcher(false);
        let event = ActionEvent::for_label(GestureLabel::Next).unwrap();

        dispatcher.dispatch(&event, Instant::now()).unwrap();
        assert_eq!(*pressed.lock().unwrap(), vec![MediaKey::NextTrack]);
    }

    #[test]
    fn test_pause_after_transport_key() {
        let (mut dispatcher, _) = dispatcher(false);
        let t0 = Instant::now();
        assert!(dispatcher.is_ready(t0));

        let event = ActionEvent::for_label(GestureLabel::PlayPause).unwrap();
        dispatcher.dispatch(&event, t0).unwrap();

        assert!(!dispatcher.is_ready(t0 + Duration::from_millis(499)));
        assert!(dispatcher.is_ready(t0 + Duration::from_millis(500)));
    }

    #[test]
    fn test_shorter_pause_after_volume_step() {
        let (mut dispatcher, _) = dispatcher(false);
        let t0 = Instant::now();

        let event = ActionEvent::for_label(GestureLabel::VolumeDown).unwrap();
        dispatcher.dispatch(&event, t0).unwrap();

        assert!(!dispatcher.is_ready(t0 + Duration::from_millis(299)));
        assert!(dispatcher.is_ready(t0 + Duration::from_millis(300)));
    }

    #[test]
    fn test_blocked_injection_is_reported_and_not_paced() {
        let (mut dispatcher, pressed) = dispatcher(true);
        let t0 = Instant::now();
        let event = ActionEvent::for_label(GestureLabel::Mute).unwrap();

        let err = dispatcher.dispatch(&event, t0).unwrap_err();
        assert!(matches!(err, DispatchError::InjectionBlocked(_)));
        assert!(pressed.lock().unwrap().is_empty());
        assert!(dispatcher.is_ready(t0));
    }

    #[test]
    fn test_dry_run_sender() {
        let mut sender = LogKeySender;
        assert!(sender.send_key(MediaKey::VolumeUp).is_ok());
        assert_eq!(sender.name(), "dry-run");
    }
}
