//! Game-context annotation attached to every shot.

use serde::{Deserialize, Serialize};

/// Ice speed as charted at the time of the shot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum IceCondition {
    Fast,
    #[default]
    Normal,
    Slow,
}

impl IceCondition {
    pub const ALL: [IceCondition; 3] = [IceCondition::Fast, IceCondition::Normal, IceCondition::Slow];

    pub fn tag(&self) -> ContextTag {
        match self {
            IceCondition::Fast => ContextTag::IceFast,
            IceCondition::Normal => ContextTag::IceNormal,
            IceCondition::Slow => ContextTag::IceSlow,
        }
    }
}

/// Situation the shot was played in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GameContext {
    /// Late-end, close-score situation
    pub pressure: bool,
    /// 0 = empty house, 1 = fully congested
    pub house_complexity: f64,
    pub ice: IceCondition,
}

/// Partition label used for situational modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextTag {
    Pressure,
    NoPressure,
    ComplexHouse,
    SimpleHouse,
    IceFast,
    IceNormal,
    IceSlow,
}

impl ContextTag {
    pub const ALL: [ContextTag; 7] = [
        ContextTag::Pressure,
        ContextTag::NoPressure,
        ContextTag::ComplexHouse,
        ContextTag::SimpleHouse,
        ContextTag::IceFast,
        ContextTag::IceNormal,
        ContextTag::IceSlow,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContextTag::Pressure => "pressure",
            ContextTag::NoPressure => "no_pressure",
            ContextTag::ComplexHouse => "complex_house",
            ContextTag::SimpleHouse => "simple_house",
            ContextTag::IceFast => "ice_fast",
            ContextTag::IceNormal => "ice_normal",
            ContextTag::IceSlow => "ice_slow",
        }
    }
}

impl std::fmt::Display for ContextTag {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl GameContext {
    /// One tag per context dimension (pressure, complexity, ice).
    pub fn tags(&self, complex_house_threshold: f64) -> [ContextTag; 3] {
        let pressure = if self.pressure {
            ContextTag::Pressure
        } else {
            ContextTag::NoPressure
        };
        let complexity = if self.house_complexity >= complex_house_threshold {
            ContextTag::ComplexHouse
        } else {
            ContextTag::SimpleHouse
        };
        [pressure, complexity, self.ice.tag()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_cover_each_dimension() {
        let ctx = GameContext {
            pressure: true,
            house_complexity: 0.8,
            ice: IceCondition::Slow,
        };
        assert_eq!(
            ctx.tags(0.5),
            [ContextTag::Pressure, ContextTag::ComplexHouse, ContextTag::IceSlow]
        );

        let calm = GameContext::default();
        assert_eq!(
            calm.tags(0.5),
            [ContextTag::NoPressure, ContextTag::SimpleHouse, ContextTag::IceNormal]
        );
    }

    #[test]
    fn test_context_deserializes_with_defaults() {
        let ctx: GameContext = serde_json::from_str(r#"{"ice": "fast"}"#).unwrap();
        assert!(!ctx.pressure);
        assert_eq!(ctx.ice, IceCondition::Fast);
    }

    #[test]
    fn test_each_ice_condition_has_its_own_tag() {
        let tags: Vec<ContextTag> = IceCondition::ALL.iter().map(|ice| ice.tag()).collect();
        assert_eq!(tags, [ContextTag::IceFast, ContextTag::IceNormal, ContextTag::IceSlow]);
        for ice in IceCondition::ALL {
            let ctx = GameContext { ice, ..GameContext::default() };
            assert_eq!(ctx.tags(0.5)[2], ice.tag());
        }
    }

    #[test]
    fn test_tag_names_match_serialized_form() {
        for tag in ContextTag::ALL {
            let json = serde_json::to_string(&tag).unwrap();
            assert_eq!(json, format!("\"{}\"", tag.as_str()));
            assert_eq!(tag.to_string(), tag.as_str());
        }
    }
}
