//! Sequential scheduling of streamed response audio
//!
//! Each clip starts at `max(clock now, end of the previous clip)`, so bursts
//! of frames queue back to back without overlap.

use crate::audio::device::{AudioSink, ClipId};
use crate::messages::AudioData;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, Copy)]
struct ScheduledClip {
    id: ClipId,
    start: f64,
    end: f64,
}

pub struct PlaybackScheduler {
    sink: Arc<dyn AudioSink>,
    next_start_time: f64,
    scheduled: Vec<ScheduledClip>,
}

impl PlaybackScheduler {
    pub fn new(sink: Arc<dyn AudioSink>) -> Self {
        Self {
            sink,
            next_start_time: 0.0,
            scheduled: Vec::new(),
        }
    }

    /// Queue a clip after everything already scheduled. Returns its id.
    pub fn schedule(&mut self, clip: AudioData) -> ClipId {
        self.prune_finished();

        let start = self.next_start_time.max(self.sink.current_time());
        let end = start + clip.duration_seconds();
        let id = self.sink.play_at(clip, start);

        self.next_start_time = end;
        self.scheduled.push(ScheduledClip { id, start, end });

        debug!(
            "Scheduled clip {:?} at {:.3}s..{:.3}s ({} pending)",
            id,
            start,
            end,
            self.scheduled.len()
        );
        id
    }

    /// Stop and forget every scheduled clip and rewind the schedule.
    /// Returns how many clips were stopped.
    pub fn interrupt(&mut self) -> usize {
        let stopped = self.scheduled.len();
        for clip in self.scheduled.drain(..) {
            self.sink.stop(clip.id);
        }
        self.next_start_time = 0.0;
        stopped
    }

    /// Time at which the next clip would start if the clock were behind it
    pub fn next_start_time(&self) -> f64 {
        self.next_start_time
    }

    /// Ids of clips still scheduled or playing
    pub fn scheduled_ids(&mut self) -> Vec<ClipId> {
        self.prune_finished();
        self.scheduled.iter().map(|clip| clip.id).collect()
    }

    /// Start times of the pending clips, in schedule order
    pub fn scheduled_starts(&self) -> Vec<f64> {
        self.scheduled.iter().map(|clip| clip.start).collect()
    }

    fn prune_finished(&mut self) {
        let now = self.sink.current_time();
        let sink = &self.sink;
        self.scheduled
            .retain(|clip| clip.end > now && sink.is_active(clip.id));
    }
}
