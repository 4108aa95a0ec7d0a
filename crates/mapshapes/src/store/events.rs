//! Drawing-surface events in, outcomes and UI notices out.

use serde::{Deserialize, Serialize};

use crate::geom::RawGeometry;

use super::collection::ShapeStore;
use super::types::{DrawTool, EditError, RejectReason, ShapeId, ShapeType};

/// One user interaction reported by the drawing surface.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum ShapeEvent {
    Drawn {
        tool: DrawTool,
        geometry: RawGeometry,
    },
    Edited {
        id: ShapeId,
        geometry: RawGeometry,
    },
    Deleted {
        id: ShapeId,
    },
}

/// What applying an event did to the collection.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    Created {
        id: ShapeId,
        shape_type: ShapeType,
        trimmed_by: Vec<ShapeId>,
    },
    Rejected {
        reason: RejectReason,
        message: String,
    },
    Edited {
        id: ShapeId,
    },
    EditFailed {
        id: ShapeId,
        message: String,
    },
    Deleted {
        id: ShapeId,
    },
    NotFound {
        id: ShapeId,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    /// The drawn shape was discarded; the surface should drop its tentative layer.
    Blocking,
    /// Informational only.
    Advisory,
}

/// Feedback for the user interface.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<RejectReason>,
    pub message: String,
}

impl Outcome {
    pub fn notice(&self) -> Option<Notice> {
        match self {
            Outcome::Rejected { reason, message } => Some(Notice {
                level: NoticeLevel::Blocking,
                reason: Some(*reason),
                message: message.clone(),
            }),
            Outcome::Created { trimmed_by, .. } if !trimmed_by.is_empty() => Some(Notice {
                level: NoticeLevel::Advisory,
                reason: None,
                message: "Shape was trimmed to avoid overlapping existing shapes.".to_string(),
            }),
            Outcome::EditFailed { message, .. } => Some(Notice {
                level: NoticeLevel::Blocking,
                reason: None,
                message: message.clone(),
            }),
            Outcome::NotFound { id } => Some(Notice {
                level: NoticeLevel::Advisory,
                reason: None,
                message: format!("No shape with id {id}."),
            }),
            _ => None,
        }
    }
}

impl ShapeStore {
    /// Process one event to completion.
    pub fn apply(&mut self, event: &ShapeEvent) -> Outcome {
        match event {
            ShapeEvent::Drawn { tool, geometry } => match self.submit(*tool, geometry) {
                Ok(accepted) => Outcome::Created {
                    id: accepted.id,
                    shape_type: accepted.shape_type,
                    trimmed_by: accepted.trimmed_by,
                },
                Err(rejection) => Outcome::Rejected {
                    reason: rejection.reason(),
                    message: rejection.to_string(),
                },
            },
            ShapeEvent::Edited { id, geometry } => match self.edit(*id, geometry) {
                Ok(_) => Outcome::Edited { id: *id },
                Err(EditError::NotFound(id)) => Outcome::NotFound { id },
                Err(err) => Outcome::EditFailed {
                    id: *id,
                    message: err.to_string(),
                },
            },
            ShapeEvent::Deleted { id } => {
                if self.delete(*id) {
                    Outcome::Deleted { id: *id }
                } else {
                    Outcome::NotFound { id: *id }
                }
            }
        }
    }
}
