//! Sound pressure units.
//!
//! Volumes are stored as hundredths of a decibel of sound pressure level
//! (dB·SPL × 100), referenced at one tile from the source. Integer storage
//! keeps the flood fill to additions and subtractions.

/// Conversion factor between dB and hundredths of a dB.
pub const CENTIBELS_PER_DB: i32 = 100;

/// Loudest sound pressure level air can carry, 191 dB.
pub const MAXIMUM_VOLUME_ATMOSPHERE: i32 = 19_100;

/// Sounds quieter than 8 dB are never tracked.
pub const AUDIBILITY_FLOOR: i32 = 800;

/// Once a wavefront drops under 10 dB it stops spreading.
pub const MINIMUM_INTEREST: i32 = 1_000;

/// Converts whole decibels to hundredths of a decibel.
pub const fn db_to_mdb(db: i32) -> i32 {
    db * CENTIBELS_PER_DB
}

/// Converts hundredths of a decibel to whole decibels, rounding down.
pub const fn mdb_to_db(mdb: i32) -> i32 {
    mdb.div_euclid(CENTIBELS_PER_DB)
}
