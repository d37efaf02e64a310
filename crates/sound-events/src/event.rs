//! Sound Event Types
//!
//! One [`SoundEvent`] describes a single noise occurrence. It is built by the
//! emitting code, validated once, and then read by the propagation engine and
//! every listener pass without further mutation.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::point::Tripoint;

/// General kind of a sound, used for quick filtering by listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoundCategory {
    Background,
    Weather,
    Music,
    Movement,
    Speech,
    /// Any electronic sound that is not music or an alarm: robot speech, radio...
    ElectronicSpeech,
    Activity,
    DestructiveActivity,
    Alarm,
    /// Any violent sounding activity
    Combat,
    /// Louder than speech to get attention
    Alert,
    /// Loudest call for attention
    Order,
}

impl SoundCategory {
    /// Returns all category variants.
    pub fn all() -> &'static [SoundCategory] {
        &[
            SoundCategory::Background,
            SoundCategory::Weather,
            SoundCategory::Music,
            SoundCategory::Movement,
            SoundCategory::Speech,
            SoundCategory::ElectronicSpeech,
            SoundCategory::Activity,
            SoundCategory::DestructiveActivity,
            SoundCategory::Alarm,
            SoundCategory::Combat,
            SoundCategory::Alert,
            SoundCategory::Order,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SoundCategory::Background => "background",
            SoundCategory::Weather => "weather",
            SoundCategory::Music => "music",
            SoundCategory::Movement => "movement",
            SoundCategory::Speech => "speech",
            SoundCategory::ElectronicSpeech => "electronic_speech",
            SoundCategory::Activity => "activity",
            SoundCategory::DestructiveActivity => "destructive_activity",
            SoundCategory::Alarm => "alarm",
            SoundCategory::Combat => "combat",
            SoundCategory::Alert => "alert",
            SoundCategory::Order => "order",
        }
    }

    /// Categories that are reported to the player as warnings.
    pub fn is_urgent(self) -> bool {
        matches!(self, SoundCategory::Combat | SoundCategory::Alarm)
    }
}

impl fmt::Display for SoundCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who made a sound, derived from the `from_*` flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Player,
    Monster,
    Npc,
    /// None of the flags are set: weather, machinery, the world itself.
    Ambient,
}

/// Faction of a character that made a sound.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FactionId(pub String);

impl FactionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn none() -> Self {
        Self("no_faction".to_string())
    }
}

impl Default for FactionId {
    fn default() -> Self {
        Self::none()
    }
}

/// Faction of a monster that made a sound.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct MonsterFactionId(pub String);

impl MonsterFactionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

/// Identifier of an audio cue for the external mixer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AudioCueId {
    pub id: String,
    pub variant: String,
}

impl AudioCueId {
    pub fn new(id: impl Into<String>, variant: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            variant: variant.into(),
        }
    }
}

/// A single noise occurrence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoundEvent {
    /// Where the sound was made
    pub origin: Tripoint,
    /// Volume at one tile from the source, in hundredths of a dB
    pub volume: i32,
    pub category: SoundCategory,
    /// Description shown to the player; may only be empty for unreported sounds
    pub description: String,
    #[serde(default)]
    pub movement_noise: bool,
    #[serde(default)]
    pub from_player: bool,
    #[serde(default)]
    pub from_monster: bool,
    #[serde(default)]
    pub from_npc: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<AudioCueId>,
    #[serde(default)]
    pub faction: FactionId,
    #[serde(default)]
    pub monster_faction: MonsterFactionId,
}

impl SoundEvent {
    /// Creates an ambient sound with all `from_*` flags cleared.
    pub fn new(
        origin: Tripoint,
        volume: i32,
        category: SoundCategory,
        description: impl Into<String>,
    ) -> Self {
        Self {
            origin,
            volume,
            category,
            description: description.into(),
            movement_noise: false,
            from_player: false,
            from_monster: false,
            from_npc: false,
            audio: None,
            faction: FactionId::none(),
            monster_faction: MonsterFactionId::default(),
        }
    }

    pub fn from_player(mut self) -> Self {
        self.from_player = true;
        self
    }

    pub fn from_monster(mut self) -> Self {
        self.from_monster = true;
        self
    }

    pub fn from_npc(mut self) -> Self {
        self.from_npc = true;
        self
    }

    pub fn movement(mut self) -> Self {
        self.movement_noise = true;
        self
    }

    pub fn with_audio(mut self, id: impl Into<String>, variant: impl Into<String>) -> Self {
        self.audio = Some(AudioCueId::new(id, variant));
        self
    }

    pub fn with_faction(mut self, faction: FactionId) -> Self {
        self.faction = faction;
        self
    }

    pub fn with_monster_faction(mut self, faction: MonsterFactionId) -> Self {
        self.monster_faction = faction;
        self
    }

    /// Classifies the source from the `from_*` flags.
    ///
    /// When several flags are set the player wins, then monsters, then NPCs.
    pub fn source_kind(&self) -> SourceKind {
        if self.from_player {
            SourceKind::Player
        } else if self.from_monster {
            SourceKind::Monster
        } else if self.from_npc {
            SourceKind::Npc
        } else {
            SourceKind::Ambient
        }
    }

    /// True when some creature made this sound.
    pub fn has_creature_source(&self) -> bool {
        self.source_kind() != SourceKind::Ambient
    }

    /// Serializes the event as a single JSON line.
    pub fn to_jsonl(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserializes an event from a JSON line.
    pub fn from_jsonl(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_serialization() {
        assert_eq!(
            serde_json::to_string(&SoundCategory::ElectronicSpeech).unwrap(),
            r#""electronic_speech""#
        );
        assert_eq!(
            serde_json::to_string(&SoundCategory::DestructiveActivity).unwrap(),
            r#""destructive_activity""#
        );
        for category in SoundCategory::all() {
            let json = serde_json::to_string(category).unwrap();
            assert_eq!(json.trim_matches('"'), category.as_str());
        }
    }

    #[test]
    fn test_source_kind() {
        let origin = Tripoint::new(1, 2, 0);
        let wind = SoundEvent::new(origin, 4000, SoundCategory::Weather, "wind");
        assert_eq!(wind.source_kind(), SourceKind::Ambient);
        assert!(!wind.has_creature_source());

        let shot = SoundEvent::new(origin, 16000, SoundCategory::Combat, "a gunshot").from_player();
        assert_eq!(shot.source_kind(), SourceKind::Player);

        let steps = SoundEvent::new(origin, 2000, SoundCategory::Movement, "footsteps")
            .from_monster()
            .movement();
        assert_eq!(steps.source_kind(), SourceKind::Monster);
        assert!(steps.movement_noise);
    }

    #[test]
    fn test_jsonl_defaults() {
        let line = r#"{"origin":{"x":3,"y":4,"z":0},"volume":5000,"category":"speech","description":"a voice"}"#;
        let event = SoundEvent::from_jsonl(line).unwrap();
        assert_eq!(event.volume, 5000);
        assert!(!event.from_npc);
        assert_eq!(event.faction, FactionId::none());
        assert!(event.audio.is_none());
    }
}
