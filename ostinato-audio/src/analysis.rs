//! Analysis tap - time-domain sample window for visualization
//!
//! A non-destructive read point at the end of the processing chain. The
//! audio thread pushes mono-mixed samples into a fixed ring; the UI samples
//! an ordered snapshot once per frame through a [`TapHandle`]. The handle
//! carries the owning graph's alive token so readers stop when the graph is
//! disposed.

use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Size of the time-domain window exposed to the visualizer
pub const TAP_SIZE: usize = 2048;

struct TapBuffer {
    samples: Box<[f32; TAP_SIZE]>,
    write_pos: usize,
}

impl TapBuffer {
    fn new() -> Self {
        Self {
            samples: Box::new([0.0; TAP_SIZE]),
            write_pos: 0,
        }
    }
}

/// Write side of the tap, owned by the signal graph
pub struct AnalysisTap {
    buffer: Arc<Mutex<TapBuffer>>,
    alive: Arc<AtomicBool>,
}

impl AnalysisTap {
    pub(crate) fn new(alive: Arc<AtomicBool>) -> Self {
        Self {
            buffer: Arc::new(Mutex::new(TapBuffer::new())),
            alive,
        }
    }

    /// Push a block of interleaved stereo frames, mono-mixed into the ring
    ///
    /// Called from the audio callback: on lock contention the block is
    /// skipped rather than blocking the real-time thread.
    pub fn push(&self, frames: &[f32]) {
        if let Some(mut buf) = self.buffer.try_lock() {
            for pair in frames.chunks(2) {
                let mono = if pair.len() == 2 {
                    (pair[0] + pair[1]) * 0.5
                } else {
                    pair[0]
                };
                let pos = buf.write_pos;
                buf.samples[pos] = mono;
                buf.write_pos = (pos + 1) % TAP_SIZE;
            }
        }
    }

    /// Create a reader handle sharing this tap's buffer and alive token
    pub fn handle(&self) -> TapHandle {
        TapHandle {
            buffer: self.buffer.clone(),
            alive: self.alive.clone(),
        }
    }
}

/// Read side of the tap, held by the visualizer
#[derive(Clone)]
pub struct TapHandle {
    buffer: Arc<Mutex<TapBuffer>>,
    alive: Arc<AtomicBool>,
}

impl TapHandle {
    /// False once the owning graph has been disposed
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    /// Copy the current window, oldest sample first, into `out`
    ///
    /// Returns false without touching `out` when the owning graph is gone;
    /// the caller should drop the handle and render an idle line.
    pub fn snapshot(&self, out: &mut Vec<f32>) -> bool {
        if !self.is_alive() {
            return false;
        }

        let buf = self.buffer.lock();
        out.clear();
        out.reserve(TAP_SIZE);
        out.extend_from_slice(&buf.samples[buf.write_pos..]);
        out.extend_from_slice(&buf.samples[..buf.write_pos]);
        true
    }
}

impl fmt::Debug for TapHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TapHandle")
            .field("alive", &self.is_alive())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn live_tap() -> AnalysisTap {
        AnalysisTap::new(Arc::new(AtomicBool::new(true)))
    }

    #[test]
    fn test_snapshot_is_fixed_size() {
        let tap = live_tap();
        let handle = tap.handle();
        let mut out = Vec::new();
        assert!(handle.snapshot(&mut out));
        assert_eq!(out.len(), TAP_SIZE);
        assert!(out.iter().all(|s| *s == 0.0));
    }

    #[test]
    fn test_snapshot_orders_oldest_first() {
        let tap = live_tap();
        // Push 3 stereo frames of a recognizable ramp
        tap.push(&[1.0, 1.0, 2.0, 2.0, 3.0, 3.0]);

        let mut out = Vec::new();
        assert!(tap.handle().snapshot(&mut out));
        assert_eq!(out.len(), TAP_SIZE);
        // The newest samples sit at the end of the ordered window
        assert_eq!(&out[TAP_SIZE - 3..], &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_ring_overwrites_oldest() {
        let tap = live_tap();
        // Two full windows of stereo frames; only the second survives
        let first: Vec<f32> = vec![1.0; TAP_SIZE * 2];
        let second: Vec<f32> = vec![-1.0; TAP_SIZE * 2];
        tap.push(&first);
        tap.push(&second);

        let mut out = Vec::new();
        assert!(tap.handle().snapshot(&mut out));
        assert!(out.iter().all(|s| *s == -1.0));
    }

    #[test]
    fn test_dead_handle_yields_no_frame() {
        let alive = Arc::new(AtomicBool::new(true));
        let tap = AnalysisTap::new(alive.clone());
        let handle = tap.handle();

        alive.store(false, Ordering::Release);

        let mut out = vec![9.9];
        assert!(!handle.snapshot(&mut out));
        assert_eq!(out, vec![9.9]);
        assert!(!handle.is_alive());
    }
}
