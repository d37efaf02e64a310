//! Sound Emission
//!
//! Inbound side of the engine. Emitters queue [`SoundEvent`]s during a turn;
//! the propagation system drains the queue, turning each surviving event
//! into a [`SoundField`](crate::components::field::SoundField).

use bevy_ecs::prelude::*;
use thiserror::Error;
use tracing::{debug, warn};

use sound_events::{
    FactionId, MonsterFactionId, SoundCategory, SoundEvent, Tripoint, AUDIBILITY_FLOOR,
    MAXIMUM_VOLUME_ATMOSPHERE,
};

use crate::components::field::SoundFieldRegistry;
use crate::components::map::LocalMap;
use crate::events::logger::SoundLogger;
use crate::systems::propagation::propagate;
use crate::SimulationState;

/// Why an event was dropped before propagation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SoundRejected {
    #[error("non-positive sound volume {volume} at {origin}")]
    NonPositiveVolume { origin: Tripoint, volume: i32 },
    #[error("sound at {origin} has no description")]
    MissingDescription { origin: Tripoint },
    #[error("sound at {origin} is below the audibility floor ({volume})")]
    Inaudible { origin: Tripoint, volume: i32 },
}

impl SoundRejected {
    /// Malformed events are reported; merely quiet ones are not.
    pub fn is_malformed(&self) -> bool {
        !matches!(self, SoundRejected::Inaudible { .. })
    }
}

/// Check an event before propagation, capping it at the atmospheric maximum.
pub fn validate_sound(mut event: SoundEvent) -> Result<SoundEvent, SoundRejected> {
    let origin = event.origin;
    if event.volume <= 0 {
        return Err(SoundRejected::NonPositiveVolume {
            origin,
            volume: event.volume,
        });
    }
    if event.description.trim().is_empty() {
        return Err(SoundRejected::MissingDescription { origin });
    }
    if event.volume < AUDIBILITY_FLOOR {
        return Err(SoundRejected::Inaudible {
            origin,
            volume: event.volume,
        });
    }
    event.volume = event.volume.min(MAXIMUM_VOLUME_ATMOSPHERE);
    Ok(event)
}

/// What made a footstep
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FootstepSource {
    /// A character; whether it is the avatar is decided from the position
    Character(FactionId),
    Monster(MonsterFactionId),
}

/// Resource queueing sounds emitted during the current turn
#[derive(Resource, Debug, Default)]
pub struct PendingSounds {
    events: Vec<SoundEvent>,
}

impl PendingSounds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and queue a sound. Never fails the turn: rejected events are
    /// reported and dropped.
    pub fn emit_sound(&mut self, event: SoundEvent) -> Result<(), SoundRejected> {
        match validate_sound(event) {
            Ok(event) => {
                self.events.push(event);
                Ok(())
            }
            Err(rejected) => {
                if rejected.is_malformed() {
                    warn!(%rejected, "Dropping malformed sound");
                } else {
                    debug!(%rejected, "Dropping inaudible sound");
                }
                Err(rejected)
            }
        }
    }

    /// A sound nobody in particular made: weather, machinery, the world.
    pub fn ambient_sound(
        &mut self,
        origin: Tripoint,
        volume: i32,
        category: SoundCategory,
        description: impl Into<String>,
    ) -> Result<(), SoundRejected> {
        self.emit_sound(SoundEvent::new(origin, volume, category, description))
    }

    /// Movement noise. Character footsteps at the avatar's position count as
    /// the player's own, anywhere else as an NPC's.
    pub fn add_footstep(
        &mut self,
        origin: Tripoint,
        volume: i32,
        description: impl Into<String>,
        source: FootstepSource,
        avatar_position: Option<Tripoint>,
    ) -> Result<(), SoundRejected> {
        let event = SoundEvent::new(origin, volume, SoundCategory::Movement, description).movement();
        let event = match source {
            FootstepSource::Character(faction) => {
                let event = event.with_faction(faction);
                if avatar_position == Some(origin) {
                    event.from_player()
                } else {
                    event.from_npc()
                }
            }
            FootstepSource::Monster(faction) => event.from_monster().with_monster_faction(faction),
        };
        self.emit_sound(event)
    }

    pub fn drain(&mut self) -> Vec<SoundEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}

/// Propagate every queued event into the registry.
///
/// Events on unloaded levels or off the map are dropped. Returns how many
/// fields were created.
pub fn propagate_sounds(
    pending: &mut PendingSounds,
    map: &LocalMap,
    registry: &mut SoundFieldRegistry,
    mut logger: Option<&mut SoundLogger>,
    turn: u64,
) -> usize {
    let mut created = 0;
    for event in pending.drain() {
        let field = map
            .level(event.origin.z)
            .and_then(|level| propagate(&event, &level.absorption));
        let Some(field) = field else {
            debug!(origin = %event.origin, "Sound origin is outside the loaded map");
            continue;
        };
        if let Some(logger) = logger.as_deref_mut() {
            if let Err(e) = logger.log(turn, &field) {
                warn!(error = %e, "Failed to log sound");
            }
        }
        registry.push(field);
        created += 1;
    }
    created
}

/// System: Drain queued sounds into sound fields
pub fn propagate_pending_sounds(
    mut pending: ResMut<PendingSounds>,
    map: Res<LocalMap>,
    mut registry: ResMut<SoundFieldRegistry>,
    mut logger: Option<ResMut<SoundLogger>>,
    state: Option<Res<SimulationState>>,
) {
    let turn = state.map(|s| s.current_turn).unwrap_or(0);
    let created = propagate_sounds(
        &mut pending,
        &map,
        &mut registry,
        logger.as_deref_mut(),
        turn,
    );
    if created > 0 {
        debug!(created, turn, "Propagated sounds");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sound_events::Season;

    fn origin() -> Tripoint {
        Tripoint::new(5, 5, 0)
    }

    #[test]
    fn test_validate_rejects_bad_volume() {
        let zero = SoundEvent::new(origin(), 0, SoundCategory::Combat, "bang");
        assert!(matches!(
            validate_sound(zero),
            Err(SoundRejected::NonPositiveVolume { volume: 0, .. })
        ));
        let negative = SoundEvent::new(origin(), -500, SoundCategory::Combat, "bang");
        let rejected = validate_sound(negative).unwrap_err();
        assert!(rejected.is_malformed());
    }

    #[test]
    fn test_validate_rejects_missing_description() {
        let event = SoundEvent::new(origin(), 5000, SoundCategory::Speech, "  ");
        assert_eq!(
            validate_sound(event),
            Err(SoundRejected::MissingDescription { origin: origin() })
        );
    }

    #[test]
    fn test_validate_floor_and_cap() {
        let quiet = SoundEvent::new(origin(), 799, SoundCategory::Movement, "rustle");
        let rejected = validate_sound(quiet).unwrap_err();
        assert!(!rejected.is_malformed());

        let floor = SoundEvent::new(origin(), 800, SoundCategory::Movement, "rustle");
        assert!(validate_sound(floor).is_ok());

        let huge = SoundEvent::new(origin(), 50_000, SoundCategory::Combat, "explosion");
        assert_eq!(validate_sound(huge).unwrap().volume, MAXIMUM_VOLUME_ATMOSPHERE);
    }

    #[test]
    fn test_footstep_source_flags() {
        let mut pending = PendingSounds::new();
        let avatar = Tripoint::new(2, 2, 0);
        pending
            .add_footstep(avatar, 1500, "footsteps", FootstepSource::Character(FactionId::none()), Some(avatar))
            .unwrap();
        pending
            .add_footstep(origin(), 1500, "footsteps", FootstepSource::Character(FactionId::new("free_merchants")), Some(avatar))
            .unwrap();
        pending
            .add_footstep(origin(), 1500, "shuffling", FootstepSource::Monster(MonsterFactionId::new("zombie")), Some(avatar))
            .unwrap();

        let events = pending.drain();
        assert!(events.iter().all(|e| e.movement_noise && e.category == SoundCategory::Movement));
        assert!(events[0].from_player && !events[0].from_npc);
        assert!(events[1].from_npc && !events[1].from_player);
        assert_eq!(events[1].faction, FactionId::new("free_merchants"));
        assert!(events[2].from_monster);
        assert_eq!(events[2].monster_faction, MonsterFactionId::new("zombie"));
        assert!(pending.is_empty());
    }

    #[test]
    fn test_ambient_sound_has_no_source() {
        let mut pending = PendingSounds::new();
        pending
            .ambient_sound(origin(), 4000, SoundCategory::Weather, "thunder")
            .unwrap();
        assert_eq!(pending.len(), 1);
        assert!(!pending.drain()[0].has_creature_source());
    }

    #[test]
    fn test_propagate_sounds_skips_unloaded_levels() {
        let mut map = LocalMap::new(1, Tripoint::default());
        map.add_level(0);
        map.refresh_absorption(Season::Summer);

        let mut pending = PendingSounds::new();
        pending
            .ambient_sound(origin(), 4000, SoundCategory::Activity, "hammering")
            .unwrap();
        pending
            .ambient_sound(origin().with_z(3), 4000, SoundCategory::Activity, "hammering")
            .unwrap();
        pending
            .ambient_sound(Tripoint::new(50, 50, 0), 4000, SoundCategory::Activity, "hammering")
            .unwrap();

        let mut registry = SoundFieldRegistry::new();
        let created = propagate_sounds(&mut pending, &map, &mut registry, None, 0);
        assert_eq!(created, 1);
        assert_eq!(registry.len(), 1);
        assert!(pending.is_empty());
    }
}
