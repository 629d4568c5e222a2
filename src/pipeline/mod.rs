pub mod relay;
pub mod session;
pub mod throttle;

pub use relay::{FrameRelay, RelayStats};
pub use session::{CaptureSession, SessionEvent};
pub use throttle::Throttle;
