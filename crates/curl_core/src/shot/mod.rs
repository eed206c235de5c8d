//! Shot records, classification and target inference.

pub mod classifier;
pub mod context;
pub mod record;
pub mod target_inference;

pub use classifier::{classify, protected_stones, ShotCategory, ShotClassification};
pub use context::{ContextTag, GameContext, IceCondition};
pub use record::{ShotRecord, StoneMovement};
pub use target_inference::{infer_target, Confidence, InferredTarget};
