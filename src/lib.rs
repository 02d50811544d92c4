pub mod camera;
pub mod capture;
pub mod config;
pub mod controller;
pub mod debounce;
pub mod dispatch;
pub mod fingers;
pub mod frame_buffer;
pub mod gesture;
pub mod hand_model;
pub mod landmarks;
pub mod overlay;
pub mod preview;

// Hand skeleton layout of the landmark model
pub const LANDMARK_COUNT: usize = 21;
pub const FINGER_COUNT: usize = 5;

// Frame pipeline
pub const FRAME_BUFFER_CAPACITY: usize = 2;
pub const CAPTURE_THROTTLE_MS: u64 = 10;
pub const IDLE_SLEEP_MS: u64 = 5;

// Camera request hints
pub const FRAME_WIDTH: u32 = 640;
pub const FRAME_HEIGHT: u32 = 480;
pub const FRAME_RATE: u32 = 30;

pub use camera::{Camera, CameraError};
pub use controller::{GestureController, Pipeline};
pub use debounce::Debouncer;
pub use fingers::FingerState;
pub use gesture::GestureLabel;
pub use landmarks::{LandmarkSet, LandmarkSource};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Camera(#[from] CameraError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
