//! Audio Cues
//!
//! Outbound audio for an external mixer. Cues are queued to a worker thread
//! and played after an optional delay. Without a worker every dispatch is a
//! no-op, which is how tests and headless runs use it.

pub mod melee;
pub mod worker;

use bevy_ecs::prelude::*;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

use sound_events::{AudioCueId, Tripoint};

use crate::systems::ambient::sound_distance;

pub use melee::*;
pub use worker::*;

pub mod audio_constants {
    /// Loudest cue volume the mixer accepts
    pub const MAX_CUE_VOLUME: i32 = 100;
    /// Cue volume lost per tile of sound distance (100 over 24 tiles)
    pub const VOLUME_LOSS_PER_TILE: f32 = 4.166666;
}

use audio_constants::*;

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("failed to start audio worker: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("audio cue queue is closed")]
    QueueClosed,
    #[error("mixer rejected cue {id}/{variant}: {reason}")]
    Playback {
        id: String,
        variant: String,
        reason: String,
    },
}

/// One cue for the mixer
#[derive(Debug, Clone, PartialEq)]
pub struct CueRequest {
    pub cue: AudioCueId,
    /// 0 to 100, already scaled by the volume multiplier
    pub volume: i32,
    /// Degrees clockwise from north; `None` plays unpositioned
    pub angle: Option<f32>,
    pub delay: Duration,
}

impl CueRequest {
    pub fn new(cue: AudioCueId, volume: i32) -> Self {
        Self {
            cue,
            volume,
            angle: None,
            delay: Duration::ZERO,
        }
    }

    pub fn at_angle(mut self, angle: f32) -> Self {
        self.angle = Some(angle);
        self
    }

    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// Whatever actually makes noise
pub trait AudioSink: Send + Sync + 'static {
    fn play(&self, request: &CueRequest) -> Result<(), AudioError>;
}

/// Sink that only traces cues, for runs without a mixer attached
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl AudioSink for TracingSink {
    fn play(&self, request: &CueRequest) -> Result<(), AudioError> {
        debug!(
            id = %request.cue.id,
            variant = %request.cue.variant,
            volume = request.volume,
            angle = ?request.angle,
            "Playing audio cue"
        );
        Ok(())
    }
}

/// Volume 0-100 at which the listener hears a cue made at `source`.
pub fn heard_volume(listener: Tripoint, source: Tripoint, multiplier: f32) -> i32 {
    if source == listener {
        return (MAX_CUE_VOLUME as f32 * multiplier) as i32;
    }
    let distance = sound_distance(listener, source);
    let volume = (-VOLUME_LOSS_PER_TILE * (distance - 1) as f32 + MAX_CUE_VOLUME as f32) as i32;
    (volume.clamp(0, MAX_CUE_VOLUME) as f32 * multiplier) as i32
}

/// Direction of `source` for positional panning.
pub fn heard_angle(listener: Tripoint, source: Tripoint) -> f32 {
    listener.bearing_to(source)
}

/// Resource dispatching audio cues to the worker
#[derive(Resource)]
pub struct AudioCues {
    sender: Option<UnboundedSender<CueRequest>>,
    worker: Option<JoinHandle<()>>,
    volume_multiplier: f32,
}

impl AudioCues {
    /// Dispatcher with no worker; every cue is dropped.
    pub fn headless() -> Self {
        Self {
            sender: None,
            worker: None,
            volume_multiplier: 1.0,
        }
    }

    /// Start a worker thread playing cues on `sink`.
    pub fn start(sink: Arc<dyn AudioSink>, volume_multiplier: f32) -> Result<Self, AudioError> {
        let (sender, worker) = spawn_worker(sink)?;
        Ok(Self {
            sender: Some(sender),
            worker: Some(worker),
            volume_multiplier,
        })
    }

    pub fn is_headless(&self) -> bool {
        self.sender.is_none()
    }

    pub fn volume_multiplier(&self) -> f32 {
        self.volume_multiplier
    }

    /// Queue a cue, reporting why it could not be queued.
    pub fn try_dispatch(&self, request: CueRequest) -> Result<(), AudioError> {
        match &self.sender {
            Some(sender) => sender.send(request).map_err(|_| AudioError::QueueClosed),
            None => Ok(()),
        }
    }

    /// Queue a cue. Failures skip the cue.
    pub fn dispatch(&self, request: CueRequest) {
        if let Err(e) = self.try_dispatch(request) {
            debug!(error = %e, "Skipping audio cue");
        }
    }

    /// Play `cue` as heard by a listener at `listener`, made at `source`.
    pub fn play_heard(&self, cue: &AudioCueId, listener: Tripoint, source: Tripoint) {
        if self.is_headless() {
            return;
        }
        self.dispatch(self.heard_request(cue, listener, source));
    }

    /// Request for `cue` made at `source`, panned towards it unless the
    /// listener made it.
    pub fn heard_request(&self, cue: &AudioCueId, listener: Tripoint, source: Tripoint) -> CueRequest {
        let volume = heard_volume(listener, source, self.volume_multiplier);
        let request = CueRequest::new(cue.clone(), volume);
        if source == listener {
            request
        } else {
            request.at_angle(heard_angle(listener, source))
        }
    }

    /// Close the queue and wait for queued cues to finish playing.
    pub fn shutdown(&mut self) {
        self.sender = None;
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                debug!("Audio worker panicked");
            }
        }
    }
}

impl Default for AudioCues {
    fn default() -> Self {
        Self::headless()
    }
}

impl Drop for AudioCues {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heard_volume_falloff() {
        let me = Tripoint::new(10, 10, 0);
        assert_eq!(heard_volume(me, me, 1.0), 100);
        assert_eq!(heard_volume(me, me, 0.5), 50);
        assert_eq!(heard_volume(me, Tripoint::new(11, 10, 0), 1.0), 100);
        // -4.166666 * 11 + 100 = 54.17
        assert_eq!(heard_volume(me, Tripoint::new(22, 10, 0), 1.0), 54);
        assert_eq!(heard_volume(me, Tripoint::new(40, 10, 0), 1.0), 0);
    }

    #[test]
    fn test_heard_volume_counts_levels() {
        let me = Tripoint::new(10, 10, 0);
        // one level up is five tiles away
        assert_eq!(heard_volume(me, Tripoint::new(10, 10, 1), 1.0), 83);
    }

    #[test]
    fn test_heard_angle() {
        let me = Tripoint::new(5, 5, 0);
        assert!((heard_angle(me, Tripoint::new(5, 0, 0)) - 0.0).abs() < 0.01);
        assert!((heard_angle(me, Tripoint::new(9, 5, 0)) - 90.0).abs() < 0.01);
        assert!((heard_angle(me, Tripoint::new(5, 9, 0)) - 180.0).abs() < 0.01);
    }

    #[test]
    fn test_headless_is_noop() {
        let cues = AudioCues::headless();
        assert!(cues.is_headless());
        let request = CueRequest::new(AudioCueId::new("fire_gun", "default"), 80);
        assert!(cues.try_dispatch(request).is_ok());
        cues.play_heard(&AudioCueId::new("fire_gun", "default"), Tripoint::default(), Tripoint::default());
    }

    #[test]
    fn test_heard_request_is_panned() {
        let cues = AudioCues::headless();
        let cue = AudioCueId::new("fire_gun", "default");
        let me = Tripoint::new(5, 5, 0);

        let east = cues.heard_request(&cue, me, Tripoint::new(9, 5, 0));
        assert_eq!(east.cue, cue);
        assert_eq!(east.volume, 87);
        assert!((east.angle.unwrap() - 90.0).abs() < 0.01);

        let own = cues.heard_request(&cue, me, me);
        assert_eq!(own.volume, 100);
        assert_eq!(own.angle, None);
    }
}
