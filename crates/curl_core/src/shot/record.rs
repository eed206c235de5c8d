//! Observed shot records
//!
//! A `ShotRecord` is one historical observation: who threw, where every stone
//! was before and after, and the game situation. Records are immutable input;
//! nothing in the pipeline writes back to them.

use serde::{Deserialize, Serialize};

use super::context::GameContext;
use crate::error::RecordError;
use crate::geometry::Point;

/// One stone's state around a single shot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoneMovement {
    pub stone_id: String,
    /// `None` when the stone entered play during this shot
    #[serde(default)]
    pub before: Option<Point>,
    /// `None` when the stone left the sheet
    #[serde(default)]
    pub after: Option<Point>,
    #[serde(default)]
    pub removed: bool,
    /// Explicit thrown-stone marker
    #[serde(default)]
    pub thrown: bool,
}

impl StoneMovement {
    /// The stone delivered this shot, resting at `after`.
    pub fn thrown(stone_id: impl Into<String>, after: Point) -> Self {
        Self {
            stone_id: stone_id.into(),
            before: None,
            after: Some(after),
            removed: false,
            thrown: true,
        }
    }

    /// The thrown stone, gone out of play.
    pub fn thrown_out(stone_id: impl Into<String>) -> Self {
        Self {
            stone_id: stone_id.into(),
            before: None,
            after: None,
            removed: true,
            thrown: true,
        }
    }

    /// An existing stone that did not move.
    pub fn resting(stone_id: impl Into<String>, pos: Point) -> Self {
        Self::moved(stone_id, pos, pos)
    }

    /// An existing stone that moved but stayed in play.
    pub fn moved(stone_id: impl Into<String>, before: Point, after: Point) -> Self {
        Self {
            stone_id: stone_id.into(),
            before: Some(before),
            after: Some(after),
            removed: false,
            thrown: false,
        }
    }

    /// An existing stone knocked out of play.
    pub fn removed(stone_id: impl Into<String>, before: Point) -> Self {
        Self {
            stone_id: stone_id.into(),
            before: Some(before),
            after: None,
            removed: true,
            thrown: false,
        }
    }

    pub fn is_removed(&self) -> bool {
        self.removed || self.after.is_none()
    }

    pub fn is_thrown_candidate(&self) -> bool {
        self.thrown || self.before.is_none()
    }

    /// Post-shot position of a stone still in play.
    pub fn in_play_position(&self) -> Option<Point> {
        if self.is_removed() {
            None
        } else {
            self.after
        }
    }

    /// How far the stone moved during the shot.
    ///
    /// A stone with no post-shot position counts as infinitely displaced.
    /// A stone with no pre-shot position has not been displaced.
    pub fn displacement(&self) -> f64 {
        match (self.before, self.after) {
            (Some(before), Some(after)) => before.distance_to(&after),
            (Some(_), None) => f64::INFINITY,
            (None, _) => 0.0,
        }
    }
}

/// One thrown shot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShotRecord {
    pub shot_id: u64,
    pub player_id: String,
    /// Where the stone was released; required to measure accuracy
    #[serde(default)]
    pub release: Option<Point>,
    pub stones: Vec<StoneMovement>,
    #[serde(default)]
    pub context: GameContext,
}

impl ShotRecord {
    pub fn new(shot_id: u64, player_id: impl Into<String>) -> Self {
        Self {
            shot_id,
            player_id: player_id.into(),
            release: None,
            stones: Vec::new(),
            context: GameContext::default(),
        }
    }

    pub fn with_release(mut self, release: Point) -> Self {
        self.release = Some(release);
        self
    }

    pub fn with_stone(mut self, stone: StoneMovement) -> Self {
        self.stones.push(stone);
        self
    }

    pub fn with_context(mut self, context: GameContext) -> Self {
        self.context = context;
        self
    }

    /// The single thrown stone, or why the record is malformed.
    pub fn thrown_stone(&self) -> Result<&StoneMovement, RecordError> {
        let mut candidates = self.stones.iter().filter(|s| s.is_thrown_candidate());
        let first = candidates.next().ok_or(RecordError::NoThrownStone)?;
        let extra = candidates.count();
        if extra > 0 {
            return Err(RecordError::MultipleThrownStones { count: extra + 1 });
        }
        Ok(first)
    }

    /// Every stone that was in play before the shot.
    pub fn existing_stones(&self) -> impl Iterator<Item = &StoneMovement> {
        self.stones.iter().filter(|s| !s.is_thrown_candidate())
    }

    pub fn stone(&self, stone_id: &str) -> Option<&StoneMovement> {
        self.stones.iter().find(|s| s.stone_id == stone_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thrown_stone_found() {
        let record = ShotRecord::new(1, "p1")
            .with_stone(StoneMovement::resting("r1", Point::new(0.0, 34.0)))
            .with_stone(StoneMovement::thrown("y1", Point::new(0.2, 33.0)));
        assert_eq!(record.thrown_stone().unwrap().stone_id, "y1");
        assert_eq!(record.existing_stones().count(), 1);
    }

    #[test]
    fn test_no_thrown_stone_is_malformed() {
        let record = ShotRecord::new(2, "p1")
            .with_stone(StoneMovement::resting("r1", Point::new(0.0, 34.0)));
        assert_eq!(record.thrown_stone(), Err(RecordError::NoThrownStone));
    }

    #[test]
    fn test_two_thrown_stones_is_malformed() {
        let record = ShotRecord::new(3, "p1")
            .with_stone(StoneMovement::thrown("y1", Point::new(0.0, 34.0)))
            .with_stone(StoneMovement::thrown("y2", Point::new(0.5, 34.0)));
        assert_eq!(
            record.thrown_stone(),
            Err(RecordError::MultipleThrownStones { count: 2 })
        );
    }

    #[test]
    fn test_displacement() {
        let moved = StoneMovement::moved("r1", Point::new(0.0, 34.0), Point::new(0.0, 35.0));
        assert!((moved.displacement() - 1.0).abs() < 1e-12);
        assert!(StoneMovement::removed("r2", Point::new(0.0, 34.0)).displacement().is_infinite());
        assert_eq!(StoneMovement::thrown("y1", Point::ORIGIN).displacement(), 0.0);
    }

    #[test]
    fn test_record_json_shape() {
        let json = r#"{
            "shot_id": 7,
            "player_id": "CAN-skip",
            "release": {"x": 0.0, "y": 0.0},
            "stones": [
                {"stone_id": "y1", "after": {"x": 0.1, "y": 34.5}},
                {"stone_id": "r1", "before": {"x": 0.0, "y": 34.0}, "removed": true}
            ],
            "context": {"pressure": true, "house_complexity": 0.4, "ice": "slow"}
        }"#;
        let record: ShotRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.thrown_stone().unwrap().stone_id, "y1");
        assert!(record.stone("r1").unwrap().is_removed());
        assert!(record.context.pressure);
    }
}
