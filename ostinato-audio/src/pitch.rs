//! Pitch-shift stage - dual delay-line granular shifter
//!
//! Shifts perceived pitch without changing playback speed: two read taps
//! advance through a short delay line at 2^(semitones/12) while writes
//! advance at 1x, crossfaded over a fixed window to mask the tap resets.
//! This keeps the stage independent of the player's rate, which is the whole
//! reason it exists as a separate node.

/// Maximum delay line length in seconds
const MAX_DELAY_SECS: f32 = 0.1;

/// Crossfade window in seconds
const WINDOW_SECS: f32 = 0.05;

/// Stereo in-place pitch shifter
pub struct PitchShifter {
    /// Pitch shift in semitones, clamped to one octave either way
    semitones: f32,
    /// Read advance per written frame: 2^(semitones/12)
    ratio: f32,
    /// Crossfade window length in samples
    window_samples: f32,
    /// Delay rings, one per channel
    buf_l: Vec<f32>,
    buf_r: Vec<f32>,
    /// Write position in frames
    write_pos: usize,
    /// Fractional read positions for the two taps
    read_pos1: f32,
    read_pos2: f32,
    /// Progress through the current crossfade window
    crossfade_pos: f32,
}

impl PitchShifter {
    pub fn new(sample_rate: u32) -> Self {
        let sr = sample_rate as f32;
        let frames = (sr * MAX_DELAY_SECS).ceil() as usize;
        let window_samples = sr * WINDOW_SECS;
        Self {
            semitones: 0.0,
            ratio: 1.0,
            window_samples,
            buf_l: vec![0.0; frames],
            buf_r: vec![0.0; frames],
            write_pos: 0,
            read_pos1: 0.0,
            // Offset the second tap by half a window so the taps never
            // reset in the same place
            read_pos2: window_samples * 0.5,
            crossfade_pos: 0.0,
        }
    }

    /// Set pitch shift in semitones (-12 to +12)
    pub fn set_semitones(&mut self, semitones: f32) {
        self.semitones = semitones.clamp(-12.0, 12.0);
        self.ratio = 2.0f32.powf(self.semitones / 12.0);
    }

    pub fn semitones(&self) -> f32 {
        self.semitones
    }

    /// Reset delay lines and tap positions to silence
    pub fn clear(&mut self) {
        self.buf_l.fill(0.0);
        self.buf_r.fill(0.0);
        self.write_pos = 0;
        self.read_pos1 = 0.0;
        self.read_pos2 = self.window_samples * 0.5;
        self.crossfade_pos = 0.0;
    }

    /// Read a delay ring with linear interpolation
    fn read_ring(ring: &[f32], pos: f32) -> f32 {
        let len = ring.len();
        let index = pos as usize % len;
        let frac = pos.fract();
        let s0 = ring[index];
        let s1 = ring[(index + 1) % len];
        s0 + frac * (s1 - s0)
    }

    /// Process an interleaved stereo buffer in place
    pub fn process(&mut self, samples: &mut [f32]) {
        // Unity ratio is a true bypass: 100% pitch passes samples untouched.
        if self.ratio == 1.0 {
            return;
        }

        let len = self.buf_l.len() as f32;

        for frame in samples.chunks_mut(2) {
            self.buf_l[self.write_pos] = frame[0];
            self.buf_r[self.write_pos] = frame[1];
            self.write_pos = (self.write_pos + 1) % self.buf_l.len();

            let fade = (self.crossfade_pos / self.window_samples).clamp(0.0, 1.0);
            let l1 = Self::read_ring(&self.buf_l, self.read_pos1);
            let l2 = Self::read_ring(&self.buf_l, self.read_pos2);
            let r1 = Self::read_ring(&self.buf_r, self.read_pos1);
            let r2 = Self::read_ring(&self.buf_r, self.read_pos2);

            frame[0] = l1 * (1.0 - fade) + l2 * fade;
            frame[1] = r1 * (1.0 - fade) + r2 * fade;

            // Taps advance at the pitch ratio; writes advanced at 1x above
            self.read_pos1 = (self.read_pos1 + self.ratio) % len;
            self.read_pos2 = (self.read_pos2 + self.ratio) % len;

            self.crossfade_pos += 1.0;
            if self.crossfade_pos >= self.window_samples {
                self.crossfade_pos = 0.0;
                // Swap tap roles so the faded-out tap becomes the incoming one
                std::mem::swap(&mut self.read_pos1, &mut self.read_pos2);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn sine_block(freq: f32, sample_rate: f32, frames: usize) -> Vec<f32> {
        let mut out = Vec::with_capacity(frames * 2);
        for i in 0..frames {
            let v = 0.8 * (2.0 * PI * freq * i as f32 / sample_rate).sin();
            out.push(v);
            out.push(v);
        }
        out
    }

    #[test]
    fn test_semitone_clamping() {
        let mut shifter = PitchShifter::new(48000);
        shifter.set_semitones(24.0);
        assert_eq!(shifter.semitones(), 12.0);
        shifter.set_semitones(-24.0);
        assert_eq!(shifter.semitones(), -12.0);
        shifter.set_semitones(3.0);
        assert_eq!(shifter.semitones(), 3.0);
    }

    #[test]
    fn test_zero_shift_is_bypass() {
        let mut shifter = PitchShifter::new(48000);
        shifter.set_semitones(0.0);
        let original = sine_block(440.0, 48000.0, 512);
        let mut samples = original.clone();
        shifter.process(&mut samples);
        assert_eq!(samples, original);
    }

    #[test]
    fn test_octave_up_keeps_energy() {
        let mut shifter = PitchShifter::new(48000);
        shifter.set_semitones(12.0);

        // First block warms up the delay lines, second block should carry
        // real signal through both taps.
        let mut warmup = sine_block(220.0, 48000.0, 4800);
        shifter.process(&mut warmup);
        let mut samples = sine_block(220.0, 48000.0, 4800);
        shifter.process(&mut samples);

        let rms =
            (samples.iter().map(|s| s * s).sum::<f32>() / samples.len() as f32).sqrt();
        assert!(rms > 0.1, "shifted output lost energy, rms={rms}");
        assert!(samples.iter().all(|s| s.is_finite()));
    }

    #[test]
    fn test_downward_shift_stays_bounded() {
        let mut shifter = PitchShifter::new(48000);
        shifter.set_semitones(-12.0);

        for _ in 0..20 {
            let mut samples = sine_block(440.0, 48000.0, 512);
            shifter.process(&mut samples);
            for &s in &samples {
                assert!(s.is_finite());
                assert!(s.abs() < 2.0, "output exploded: {s}");
            }
        }
    }

    #[test]
    fn test_clear_resets_state() {
        let mut shifter = PitchShifter::new(48000);
        shifter.set_semitones(5.0);
        let mut samples = sine_block(440.0, 48000.0, 2048);
        shifter.process(&mut samples);

        shifter.clear();

        // After a clear the rings hold silence, so output fades from zero
        let mut quiet = vec![0.0f32; 256];
        shifter.process(&mut quiet);
        assert!(quiet.iter().all(|s| *s == 0.0));
    }
}
