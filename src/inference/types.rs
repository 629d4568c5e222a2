//! Typed model of the gateway's process-frame response.
//!
//! The gateway omits fields freely, so every field carries an explicit
//! default instead of being looked up dynamically: counts default to zero,
//! identity labels to "unknown", attention to "UNKNOWN".

use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProcessFrameResponse {
    pub faces: Vec<FaceDetection>,
    pub total_detections: u32,
    pub known_faces: u32,
    pub new_faces: u32,
    pub focused: u32,
    pub unfocused: u32,
    pub hands_raised: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FaceDetection {
    pub bounding_box: BoundingBox,
    pub person_id: String,
    pub attention_status: String,
    pub is_hand_raised: bool,
    pub confidence: Option<f64>,
}

impl Default for FaceDetection {
    fn default() -> Self {
        Self {
            bounding_box: BoundingBox::default(),
            person_id: "unknown".into(),
            attention_status: "UNKNOWN".into(),
            is_hand_raised: false,
            confidence: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct BoundingBox {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_body_defaults_everything() {
        let resp: ProcessFrameResponse = serde_json::from_str("{}").unwrap();
        assert!(resp.faces.is_empty());
        assert_eq!(resp.total_detections, 0);
        assert_eq!(resp.hands_raised, 0);
    }

    #[test]
    fn partial_face_entry_gets_defaults() {
        let resp: ProcessFrameResponse = serde_json::from_str(
            r#"{"faces": [{"bounding_box": {"x": 10, "y": 20, "width": 64, "height": 64}}]}"#,
        )
        .unwrap();

        let face = &resp.faces[0];
        assert_eq!(face.person_id, "unknown");
        assert_eq!(face.attention_status, "UNKNOWN");
        assert!(!face.is_hand_raised);
        assert_eq!(face.bounding_box.x, 10);
        assert_eq!(face.bounding_box.height, 64);
    }

    #[test]
    fn full_response_parses() {
        let resp: ProcessFrameResponse = serde_json::from_str(
            r#"{
                "faces": [
                    {
                        "bounding_box": {"x": 0, "y": 0, "width": 32, "height": 48},
                        "person_id": "student_demo_123",
                        "attention_status": "FOCUSED",
                        "is_hand_raised": true,
                        "confidence": 0.93
                    }
                ],
                "total_detections": 1,
                "known_faces": 1,
                "new_faces": 0,
                "focused": 1,
                "unfocused": 0,
                "hands_raised": 1
            }"#,
        )
        .unwrap();

        assert_eq!(resp.faces[0].person_id, "student_demo_123");
        assert!(resp.faces[0].is_hand_raised);
        assert_eq!(resp.focused, 1);
    }
}
