//! Decoded audio source handle

use std::sync::Arc;

/// Handle to decoded audio data, owned by the current signal graph.
///
/// Samples are interleaved stereo f32, already resampled to the output rate.
/// Arc keeps the install path cheap when a source crosses the command channel.
#[derive(Debug, Clone)]
pub struct AudioSource {
    samples: Arc<Vec<f32>>,
    sample_rate: u32,
    name: Option<String>,
}

impl AudioSource {
    pub fn new(samples: Arc<Vec<f32>>, sample_rate: u32, name: Option<String>) -> Self {
        Self {
            samples,
            sample_rate,
            name,
        }
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds (samples are stereo interleaved)
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / (self.sample_rate as f64 * 2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_stereo() {
        let source = AudioSource::new(Arc::new(vec![0.0; 48000 * 2]), 48000, None);
        assert!((source.duration_secs() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_source_duration() {
        let source = AudioSource::new(Arc::new(Vec::new()), 0, None);
        assert_eq!(source.duration_secs(), 0.0);
        assert!(source.is_empty());
    }
}
