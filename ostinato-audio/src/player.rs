//! Player node - looped sample playback with variable rate

use crate::source::AudioSource;

/// Plays an [`AudioSource`] in a loop at a variable playback rate.
///
/// The node always loops: a loaded clip replays until stopped or the owning
/// graph is replaced. Rate changes only alter how fast the read position
/// advances; pitch correction happens downstream in the shift stage.
pub struct PlayerNode {
    source: AudioSource,
    /// Current playback position in interleaved sample index space
    position: f64,
    /// Playback rate (1.0 = original speed)
    rate: f64,
    playing: bool,
}

impl PlayerNode {
    pub fn new(source: AudioSource) -> Self {
        Self {
            source,
            position: 0.0,
            rate: 1.0,
            playing: false,
        }
    }

    pub fn start(&mut self) {
        if !self.source.is_empty() {
            self.playing = true;
        }
    }

    pub fn stop(&mut self) {
        self.playing = false;
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Set playback rate; non-positive values are ignored
    pub fn set_rate(&mut self, rate: f64) {
        if rate > 0.0 {
            self.rate = rate;
        }
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn source(&self) -> &AudioSource {
        &self.source
    }

    pub fn duration_secs(&self) -> f64 {
        self.source.duration_secs()
    }

    pub fn position_secs(&self) -> f64 {
        let rate = self.source.sample_rate();
        if rate == 0 {
            return 0.0;
        }
        self.position / (rate as f64 * 2.0)
    }

    /// Fill an interleaved stereo buffer with the next block of samples
    ///
    /// Emits silence when stopped so downstream stages (and the analysis tap)
    /// keep seeing a flat signal while paused.
    pub fn process(&mut self, output: &mut [f32]) {
        let samples = self.source.samples();
        if !self.playing || samples.is_empty() {
            output.fill(0.0);
            return;
        }

        let sample_count = samples.len();

        for frame in output.chunks_mut(2) {
            // Loop wrap before reading so position stays in range
            if self.position as usize + 1 >= sample_count {
                self.position = 0.0;
            }

            // Linear interpolation for smoother playback at non-integer positions
            let frac = self.position.fract() as f32;
            let pos_even = (self.position as usize) & !1; // left channel aligned

            if pos_even + 3 < sample_count {
                let l0 = samples[pos_even];
                let r0 = samples[pos_even + 1];
                let l1 = samples[pos_even + 2];
                let r1 = samples[pos_even + 3];

                frame[0] = l0 + frac * (l1 - l0);
                frame[1] = r0 + frac * (r1 - r0);
            } else {
                frame[0] = samples[pos_even];
                frame[1] = samples[pos_even + 1];
            }

            // Advance position based on rate (2 floats per stereo frame)
            self.position += 2.0 * self.rate;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn ramp_source(frames: usize) -> AudioSource {
        let mut samples = Vec::with_capacity(frames * 2);
        for i in 0..frames {
            let v = i as f32 / frames as f32;
            samples.push(v);
            samples.push(-v);
        }
        AudioSource::new(Arc::new(samples), 48000, None)
    }

    #[test]
    fn test_silence_when_stopped() {
        let mut player = PlayerNode::new(ramp_source(256));
        let mut out = vec![1.0f32; 64];
        player.process(&mut out);
        assert!(out.iter().all(|s| *s == 0.0));
    }

    #[test]
    fn test_start_requires_samples() {
        let mut player = PlayerNode::new(AudioSource::new(Arc::new(Vec::new()), 48000, None));
        player.start();
        assert!(!player.is_playing());
    }

    #[test]
    fn test_playback_produces_signal() {
        let mut player = PlayerNode::new(ramp_source(256));
        player.start();
        let mut out = vec![0.0f32; 128];
        player.process(&mut out);
        assert!(out.iter().any(|s| s.abs() > 0.0));
    }

    #[test]
    fn test_loops_past_end() {
        let mut player = PlayerNode::new(ramp_source(32));
        player.start();
        // Process far more frames than the clip holds; the loop must wrap
        // instead of stopping or reading out of range.
        let mut out = vec![0.0f32; 32 * 2 * 4];
        player.process(&mut out);
        assert!(player.is_playing());
        assert!(player.position_secs() < player.duration_secs());
    }

    #[test]
    fn test_rate_scales_advance() {
        let mut slow = PlayerNode::new(ramp_source(4096));
        let mut fast = PlayerNode::new(ramp_source(4096));
        slow.set_rate(0.5);
        fast.set_rate(2.0);
        slow.start();
        fast.start();

        let mut out = vec![0.0f32; 256];
        slow.process(&mut out);
        fast.process(&mut out);

        assert!((fast.position_secs() - slow.position_secs() * 4.0).abs() < 1e-6);
    }

    #[test]
    fn test_non_positive_rate_ignored() {
        let mut player = PlayerNode::new(ramp_source(64));
        player.set_rate(0.0);
        assert_eq!(player.rate(), 1.0);
        player.set_rate(-1.0);
        assert_eq!(player.rate(), 1.0);
        player.set_rate(1.5);
        assert_eq!(player.rate(), 1.5);
    }
}
