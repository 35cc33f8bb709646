//! Splice Timeline - non-destructive timeline engine
//!
//! Implements the editing core of the video editor:
//! - The TimelineSchema document (timeline, tracks, clips, sources)
//! - Defensive validation of untrusted schema JSON
//! - Pure edit reducers (split, trim, move, insert, transitions, ...)
//! - Snapshot undo/redo, selection and clipboard state
//! - Snapping for interactive drag and trim
//! - An `EditSession` tying the pieces together for a host

pub mod clip;
pub mod clipboard;
pub mod edit;
pub mod effect;
pub mod error;
pub mod history;
pub mod ids;
pub mod marker;
pub mod selection;
pub mod serialization;
pub mod session;
pub mod snapping;
pub mod source;
pub mod timeline;
pub mod track;
pub mod transition;
pub mod validation;

pub use clip::{Clip, ClipProperties, ClipState, Crop, Transform};
pub use clipboard::{ClipboardData, ClipboardEntry, ClipboardManager, PasteOutcome, PastedClip, SkippedEntry};
pub use edit::{apply, ClipUpdate, Edit, TrackUpdate, TrimSide};
pub use effect::{Effect, EffectParameter, EffectType, Interpolation, ParamKeyframe, ParamType, ParamValue};
pub use error::{EditError, EditResult, Result, TimelineError};
pub use history::{HistoryConfig, Snapshot, TimelineHistory};
pub use marker::Marker;
pub use selection::SelectionManager;
pub use serialization::SchemaFile;
pub use session::{EditSession, SessionConfig};
pub use snapping::{MoveSnap, SnapConfig, SnapGuide, SnapKind, SnapPoint, SnapResult, SnappingEngine, TrimSnap};
pub use source::{MediaMetadata, MediaSource, SourceType};
pub use timeline::{FieldOrder, Timeline, TimelineMetadata, TimelineSchema, CURRENT_SCHEMA_VERSION};
pub use track::{Gap, Track, TrackKind};
pub use transition::{Transition, TransitionType};
pub use validation::{validate_timeline_schema, Validated, ValidationErrors, ValidationIssue};
