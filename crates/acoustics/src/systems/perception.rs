//! Player Perception System
//!
//! The avatar's hearing pass. On top of what creatures get, the player is
//! told about sounds, woken by them, and shown markers where unseen sounds
//! came from.

use bevy_ecs::prelude::*;
use rand::seq::SliceRandom;
use rand::Rng;

use sound_events::{mdb_to_db, Compass, SoundCategory, SoundEvent, Tripoint};

use crate::audio::AudioCues;
use crate::components::creatures::Avatar;
use crate::components::field::SoundFieldRegistry;
use crate::components::listener::{Listener, SleepDepth};
use crate::components::map::LocalMap;
use crate::output::markers::SoundMarkers;
use crate::output::messages::{MessageLog, Severity};
use crate::systems::ambient::{vertical_attenuation, Weather};
use crate::systems::hearing::{apply_hearing_damage, DeafeningBand, HearingDamage};
use crate::SimRng;

pub mod perception_constants {
    /// Sides of each die rolled against the felt dB to wake a sleeper
    pub const WAKE_DIE_SIDES: i32 = 15;
    /// Routine sounds are described one time in this many
    pub const ROUTINE_SOUND_ODDS: u32 = 100;
}

use perception_constants::*;

/// Where the player pass writes its results
pub struct PerceptionOutput<'a> {
    pub messages: &'a mut MessageLog,
    pub markers: &'a mut SoundMarkers,
    pub audio: &'a AudioCues,
}

/// Sum of `dice` rolls of a 15-sided die.
pub fn roll_wake_dice(depth: SleepDepth, rng: &mut impl Rng) -> i32 {
    (0..depth.wake_dice())
        .map(|_| rng.gen_range(1..=WAKE_DIE_SIDES))
        .sum()
}

/// Should a sound of `category` be put in the message log?
///
/// From the player's own position only electronic speech and alarms are
/// worth a line. Elsewhere routine noise is mentioned rarely.
pub fn describe_sound(category: SoundCategory, from_own_position: bool, rng: &mut impl Rng) -> bool {
    use SoundCategory::*;
    if from_own_position {
        return matches!(category, ElectronicSpeech | Alarm);
    }
    match category {
        Background | Weather | Music | Movement | Activity | DestructiveActivity => {
            rng.gen_ratio(1, ROUTINE_SOUND_ODDS)
        }
        Speech | ElectronicSpeech | Alarm | Combat | Alert | Order => true,
    }
}

/// Radius of uncertainty of a marker. Loud sounds relative to their
/// distance are easier to pin down.
pub fn marker_error_radius(db: i32, distance: i32) -> i32 {
    let distance = distance.max(1);
    let ratio = (db + distance) / distance;
    if ratio < 2 {
        3
    } else if ratio < 3 {
        2
    } else {
        1
    }
}

fn message_text<L: Listener + ?Sized>(listener: &L, event: &SoundEvent, description: &str) -> String {
    let pos = listener.position();
    if event.origin == pos {
        format!("From your position you hear {}", description)
    } else if listener.sees(event.origin) {
        format!("You hear {}", description)
    } else {
        let direction = Compass::between(pos, event.origin);
        format!("From the {} you hear {}", direction.name(), description)
    }
}

/// Ring the alarm clock if it is down to its last turn.
fn check_alarm_clock<L: Listener + ?Sized>(listener: &mut L, slept_through: bool, messages: &mut MessageLog) {
    if listener.is_asleep() || listener.alarm_clock() != Some(1) {
        return;
    }
    if slept_through {
        messages.add(Severity::Info, "Your alarm clock finally wakes you up.");
    } else if !listener.trying_to_sleep() {
        messages.add(Severity::Info, "Your alarm clock wakes you up.");
    } else {
        messages.add(
            Severity::Info,
            "Your alarm clock goes off and you haven't slept a wink.",
        );
        listener.cancel_activity();
    }
    messages.add(Severity::Info, "You turn off your alarm-clock.");
    listener.turn_off_alarm_clock();
}

/// Place a marker somewhere near `event`'s origin that the listener cannot see.
fn place_marker<L: Listener + ?Sized>(
    listener: &L,
    event: &SoundEvent,
    db: i32,
    map: &LocalMap,
    markers: &mut SoundMarkers,
    rng: &mut impl Rng,
) {
    let pos = listener.position();
    let radius = marker_error_radius(db, pos.square_dist(event.origin));
    let other_level = event.origin.z != pos.z;
    let unseen: Vec<Tripoint> = event
        .origin
        .points_in_radius(radius)
        .filter(|p| map.in_bounds(*p))
        .filter(|p| other_level || !listener.sees(*p))
        .collect();
    if let Some(spot) = unseen.choose(rng) {
        markers.place(*spot, event.clone());
    }
}

/// Run the player's hearing pass over this turn's sounds.
///
/// Returns the index of the loudest sound reported to the player.
pub fn perceive_sounds<L, R>(
    listener: &mut L,
    registry: &mut SoundFieldRegistry,
    map: &LocalMap,
    weather: &Weather,
    out: PerceptionOutput<'_>,
    rng: &mut R,
) -> Option<usize>
where
    L: Listener + ?Sized,
    R: Rng,
{
    let pos = listener.position();

    let mut loudest_tile = 0;
    for field in registry.fields_mut() {
        field.heard_by_player = true;
        let tile = field.volume_at(pos);
        if tile > 0 {
            loudest_tile = loudest_tile.max(tile - vertical_attenuation(field.origin().z, pos.z));
        }
    }
    listener.record_felt_loudness(mdb_to_db(loudest_tile));

    if !listener.can_hear() {
        listener.hear_sound(None, 0, 0);
        return None;
    }

    let ambient = weather.ambient_floor(pos.z, map.is_sheltered(pos));
    let audible_over = ambient - listener.hearing_margin();
    let protection = listener.hearing_protection();
    let band = DeafeningBand::for_ability(listener.hearing_ability());
    let mut deaf = listener.is_deaf();
    let mut reported: Option<(usize, i32)> = None;

    for (index, field) in registry.fields().iter().enumerate() {
        let tile = field.volume_at(pos);
        if tile <= 0 {
            continue;
        }
        let adjusted =
            (tile - vertical_attenuation(field.origin().z, pos.z) - protection.passive_db).max(0);
        if adjusted <= audible_over {
            continue;
        }

        let deafening = adjusted - protection.active_db;
        if deafening >= band.threshold || deaf {
            let damage = apply_hearing_damage(listener, deafening.max(0), band, rng);
            if deaf {
                if let HearingDamage::Aggravated { ache: true, .. } = damage {
                    out.messages.add(Severity::Bad, "Your eardrums suddenly ache!");
                }
                continue;
            }
            if listener.is_deaf() {
                deaf = true;
                continue;
            }
        }

        let event = &field.event;
        let slept_through = listener.slept_through_alarm();
        let db = mdb_to_db(adjusted);

        if listener.is_asleep() {
            let roll = roll_wake_dice(listener.sleep_depth(), rng);
            if roll < db && !listener.under_narcosis() {
                listener.wake_up();
                out.messages.add(Severity::Warning, "Something is making noise.");
            } else {
                continue;
            }
        }

        let description = if event.description.is_empty() {
            "a noise"
        } else {
            event.description.as_str()
        };

        if event.has_creature_source() && event.origin != pos && !listener.sees(event.origin) {
            listener.distract(&format!("Heard {}!", description));
        }

        if describe_sound(event.category, event.origin == pos, rng) {
            let severity = if event.category.is_urgent() {
                Severity::Warning
            } else {
                Severity::Info
            };
            out.messages.add(severity, message_text(&*listener, event, description));
        }

        check_alarm_clock(listener, slept_through, out.messages);

        if let Some(cue) = &event.audio {
            out.audio.play_heard(cue, pos, event.origin);
        }

        if reported.map_or(true, |(_, best)| adjusted > best) {
            reported = Some((index, adjusted));
        }

        if event.origin == pos || listener.sees(event.origin) {
            continue;
        }
        place_marker(&*listener, event, db, map, out.markers, rng);
    }

    match reported {
        Some((index, felt)) => {
            listener.hear_sound(Some(&registry.fields()[index].event), felt, ambient);
            Some(index)
        }
        None => {
            listener.hear_sound(None, 0, ambient);
            None
        }
    }
}

/// System: The avatar hears the turn's sounds
#[allow(clippy::too_many_arguments)]
pub fn process_player_perception(
    mut registry: ResMut<SoundFieldRegistry>,
    map: Res<LocalMap>,
    weather: Res<Weather>,
    mut messages: ResMut<MessageLog>,
    mut markers: ResMut<SoundMarkers>,
    audio: Option<Res<AudioCues>>,
    mut rng: ResMut<SimRng>,
    mut avatars: Query<&mut Avatar>,
) {
    let headless = AudioCues::headless();
    let audio = audio.as_deref().unwrap_or(&headless);
    for mut avatar in avatars.iter_mut() {
        let out = PerceptionOutput {
            messages: &mut *messages,
            markers: &mut *markers,
            audio,
        };
        perceive_sounds(&mut *avatar, &mut registry, &map, &weather, out, &mut rng.0);
    }
}
