//! Ambient Noise and Level Attenuation
//!
//! The noise floor a listener has to hear over, and how much sound is lost
//! travelling between z-levels.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

use sound_events::{db_to_mdb, Season, Tripoint, MAXIMUM_VOLUME_ATMOSPHERE};

/// Constants for ambient noise and vertical losses
pub mod ambient_constants {
    /// Quietest outdoor ambient, in dB
    pub const MIN_OUTDOOR_AMBIENT_DB: i32 = 40;
    /// Quietest sheltered or underground ambient, in dB
    pub const MIN_SHELTERED_AMBIENT_DB: i32 = 20;
    /// Wind noise is `40 + windspeed` dB up to this cap
    pub const MAX_WIND_NOISE_DB: i32 = 180;
    /// Loss per z-level crossed above ground, in hundredths of a dB
    pub const ABOVE_GROUND_LEVEL_LOSS: i32 = 2000;
    /// Loss per z-level of rock crossed underground
    pub const UNDERGROUND_LEVEL_LOSS: i32 = 4200;
}

use ambient_constants::*;

/// Resource describing current weather
#[derive(Resource, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Weather {
    /// Noise produced by the current weather type, in dB
    pub sound_attn_db: i32,
    pub windspeed_mph: i32,
    pub season: Season,
}

impl Default for Weather {
    fn default() -> Self {
        Self {
            sound_attn_db: 0,
            windspeed_mph: 0,
            season: Season::default(),
        }
    }
}

impl Weather {
    /// Outdoor ambient at ground level in dB: the louder of weather and wind.
    pub fn outdoor_ambient_db(&self) -> i32 {
        let weather = self.sound_attn_db.max(MIN_OUTDOOR_AMBIENT_DB);
        let wind = (MIN_OUTDOOR_AMBIENT_DB + self.windspeed_mph).min(MAX_WIND_NOISE_DB);
        weather.max(wind)
    }

    /// Ambient floor for a listener, in hundredths of a dB.
    ///
    /// Underground or under a roof the outdoor ambient is halved, with a
    /// 20 dB minimum.
    pub fn ambient_floor(&self, z: i32, sheltered: bool) -> i32 {
        let outdoor = self.outdoor_ambient_db();
        if z < 0 || sheltered {
            db_to_mdb((outdoor / 2).max(MIN_SHELTERED_AMBIENT_DB))
        } else {
            db_to_mdb(outdoor)
        }
    }
}

/// Loss between two z-levels, in hundredths of a dB.
///
/// Levels crossed below ground go through rock and cost more than open
/// stairwells and floors above ground.
pub fn vertical_attenuation(source_z: i32, listener_z: i32) -> i32 {
    let lower = source_z.min(listener_z);
    let displacement = (source_z - listener_z).abs();
    if displacement == 0 {
        return 0;
    }
    let underground = if lower < 0 { (-lower).min(displacement) } else { 0 };
    let above = displacement - underground;
    (above * ABOVE_GROUND_LEVEL_LOSS + underground * UNDERGROUND_LEVEL_LOSS)
        .min(MAXIMUM_VOLUME_ATMOSPHERE)
}

/// Effective distance used to scale audio cue volume.
///
/// Vertical distance counts five times over, with a surcharge for the first
/// underground level and a much larger one for each further level of rock.
pub fn sound_distance(source: Tripoint, sink: Tripoint) -> i32 {
    let lower_z = source.z.min(sink.z);
    let displacement = (source.z - sink.z).abs();
    let mut vertical = displacement;
    if lower_z < 0 && displacement > 0 {
        vertical += 4;
        let underground = (-lower_z).min(displacement);
        vertical += (underground - 1) * 20;
    }
    source.square_dist_2d(sink) + vertical * 5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outdoor_ambient() {
        let calm = Weather::default();
        assert_eq!(calm.outdoor_ambient_db(), 40);

        let windy = Weather {
            windspeed_mph: 25,
            ..Default::default()
        };
        assert_eq!(windy.outdoor_ambient_db(), 65);

        let storm = Weather {
            sound_attn_db: 80,
            windspeed_mph: 300,
            ..Default::default()
        };
        assert_eq!(storm.outdoor_ambient_db(), 180);
    }

    #[test]
    fn test_sheltered_ambient_is_halved() {
        let weather = Weather {
            windspeed_mph: 30,
            ..Default::default()
        };
        assert_eq!(weather.ambient_floor(0, false), 7000);
        assert_eq!(weather.ambient_floor(0, true), 3500);
        assert_eq!(weather.ambient_floor(-2, false), 3500);

        let calm = Weather::default();
        assert_eq!(calm.ambient_floor(-1, false), 2000);
    }

    #[test]
    fn test_vertical_attenuation() {
        assert_eq!(vertical_attenuation(0, 0), 0);
        assert_eq!(vertical_attenuation(0, 2), 4000);
        assert_eq!(vertical_attenuation(2, 0), 4000);
        assert_eq!(vertical_attenuation(0, -1), 4200);
        assert_eq!(vertical_attenuation(1, -1), 6200);
        assert_eq!(vertical_attenuation(-10, 0), MAXIMUM_VOLUME_ATMOSPHERE);
    }

    #[test]
    fn test_sound_distance() {
        let a = Tripoint::new(0, 0, 0);
        assert_eq!(sound_distance(a, Tripoint::new(3, 4, 0)), 4);
        assert_eq!(sound_distance(a, Tripoint::new(0, 0, 1)), 5);
        assert_eq!(sound_distance(a, Tripoint::new(0, 0, -1)), 25);
        assert_eq!(sound_distance(a, Tripoint::new(0, 0, -2)), 130);
    }
}
