//! Audio Worker
//!
//! A dedicated thread running a single-threaded tokio runtime. Each queued
//! cue becomes a task that sleeps for its delay and then plays, so delayed
//! cues never hold up the ones behind them.

use std::sync::Arc;
use std::thread::JoinHandle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinSet;
use tracing::{debug, warn};

use super::{AudioError, AudioSink, CueRequest};

/// Spawn the worker thread and return the queue feeding it.
///
/// The worker exits once every sender is dropped and the cues already
/// queued have played.
pub fn spawn_worker(
    sink: Arc<dyn AudioSink>,
) -> Result<(UnboundedSender<CueRequest>, JoinHandle<()>), AudioError> {
    let (tx, rx) = mpsc::unbounded_channel();
    let handle = std::thread::Builder::new()
        .name("audio-cues".to_string())
        .spawn(move || {
            let runtime = match tokio::runtime::Builder::new_current_thread()
                .enable_time()
                .build()
            {
                Ok(runtime) => runtime,
                Err(e) => {
                    warn!(error = %e, "Failed to start audio runtime, cues are disabled");
                    return;
                }
            };
            runtime.block_on(run_worker(rx, sink));
        })?;
    Ok((tx, handle))
}

async fn run_worker(mut rx: UnboundedReceiver<CueRequest>, sink: Arc<dyn AudioSink>) {
    let mut playing = JoinSet::new();
    while let Some(request) = rx.recv().await {
        let sink = Arc::clone(&sink);
        playing.spawn(async move {
            if !request.delay.is_zero() {
                tokio::time::sleep(request.delay).await;
            }
            if let Err(e) = sink.play(&request) {
                debug!(error = %e, "Audio cue failed");
            }
        });
        // Reap finished cues so the set does not grow over a long session.
        while playing.try_join_next().is_some() {}
    }
    while playing.join_next().await.is_some() {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::AudioCues;
    use sound_events::AudioCueId;
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Default)]
    struct RecordingSink {
        played: Mutex<Vec<CueRequest>>,
    }

    impl AudioSink for RecordingSink {
        fn play(&self, request: &CueRequest) -> Result<(), AudioError> {
            if request.cue.id == "broken" {
                return Err(AudioError::Playback {
                    id: request.cue.id.clone(),
                    variant: request.cue.variant.clone(),
                    reason: "no such sample".to_string(),
                });
            }
            self.played.lock().unwrap().push(request.clone());
            Ok(())
        }
    }

    #[test]
    fn test_worker_plays_queued_cues() {
        let sink = Arc::new(RecordingSink::default());
        let mut cues = AudioCues::start(sink.clone(), 1.0).unwrap();
        cues.dispatch(CueRequest::new(AudioCueId::new("melee_swing", "default"), 70));
        cues.dispatch(CueRequest::new(AudioCueId::new("broken", "default"), 70));
        cues.dispatch(
            CueRequest::new(AudioCueId::new("melee_hit_flesh", "default"), 60)
                .after(Duration::from_millis(20)),
        );
        cues.shutdown();

        let played = sink.played.lock().unwrap();
        assert_eq!(played.len(), 2);
        assert!(played.iter().any(|r| r.cue.id == "melee_hit_flesh"));
    }

    #[test]
    fn test_dispatch_after_shutdown_is_skipped() {
        let sink = Arc::new(RecordingSink::default());
        let mut cues = AudioCues::start(sink.clone(), 1.0).unwrap();
        cues.shutdown();
        assert!(cues.is_headless());
        cues.dispatch(CueRequest::new(AudioCueId::new("melee_swing", "default"), 70));
        assert!(sink.played.lock().unwrap().is_empty());
    }
}
