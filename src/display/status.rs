//! Pull-based status rendering.
//!
//! `render` is invoked once per display tick with the viewer state as an
//! explicit argument; there is no ambient UI state and no callback
//! registration.

use std::fmt::Write;
use std::time::Instant;

use crate::inference::ProcessFrameResponse;

/// Everything the status line is derived from.
#[derive(Default)]
pub struct ViewerState {
    /// Sequence number of the most recently displayed frame
    pub frame_sequence: u64,
    pub frame_dims: (u32, u32),
    pub last_result: Option<ProcessFrameResponse>,
    pub last_error: Option<String>,
    pub last_forwarded_at: Option<Instant>,
    /// Set when the capture task exited on a read failure
    pub session_ended: Option<String>,
}

pub fn render(state: &ViewerState) -> String {
    if state.frame_sequence == 0 {
        return "waiting for first frame".into();
    }

    let mut line = format!(
        "frame #{} {}x{}",
        state.frame_sequence, state.frame_dims.0, state.frame_dims.1
    );

    if let Some(result) = &state.last_result {
        let _ = write!(
            line,
            " | faces {} (known {}, new {}) | focused {} / unfocused {} | hands {}",
            result.total_detections,
            result.known_faces,
            result.new_faces,
            result.focused,
            result.unfocused,
            result.hands_raised,
        );
    }

    if let Some(at) = state.last_forwarded_at {
        let _ = write!(line, " | inference {:.1}s ago", at.elapsed().as_secs_f64());
    }

    if let Some(err) = &state.last_error {
        let _ = write!(line, " | gateway error: {}", err);
    }

    if let Some(reason) = &state.session_ended {
        let _ = write!(line, " | capture ended: {}", reason);
    }

    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_frame_renders_waiting() {
        assert_eq!(render(&ViewerState::default()), "waiting for first frame");
    }

    #[test]
    fn gateway_error_keeps_the_frame_line() {
        let state = ViewerState {
            frame_sequence: 42,
            frame_dims: (800, 600),
            last_error: Some("gateway unreachable: connection refused".into()),
            ..Default::default()
        };

        let line = render(&state);
        assert!(line.starts_with("frame #42 800x600"));
        assert!(line.contains("gateway error"));
    }

    #[test]
    fn counts_appear_after_a_result() {
        let state = ViewerState {
            frame_sequence: 7,
            frame_dims: (640, 480),
            last_result: Some(ProcessFrameResponse {
                total_detections: 3,
                known_faces: 2,
                new_faces: 1,
                focused: 2,
                unfocused: 1,
                hands_raised: 1,
                ..Default::default()
            }),
            ..Default::default()
        };

        let line = render(&state);
        assert!(line.contains("faces 3 (known 2, new 1)"));
        assert!(line.contains("hands 1"));
    }
}
