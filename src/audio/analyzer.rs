use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use rustfft::{num_complex::Complex, Fft, FftPlanner};

// Frequency magnitudes are mapped onto bytes over this decibel range;
// anything quieter than MIN_DECIBELS reads as 0, louder than MAX as 255.
const MIN_DECIBELS: f32 = -100.0;
const MAX_DECIBELS: f32 = -30.0;

/// One tick's worth of analyser output. Both arrays have `bin_count`
/// elements. Transient: produced per tick and discarded.
pub struct AnalysisSnapshot {
    /// Byte-scaled samples, 128 = zero crossing.
    pub time_domain: Vec<u8>,
    /// Byte-scaled magnitudes per frequency bin.
    pub frequency: Vec<u8>,
}

/// Mono sample ring shared between the output callback (producer) and the
/// analyser (consumer). Holds the most recent `capacity` samples.
pub struct AnalysisRing {
    buf: VecDeque<f32>,
    capacity: usize,
    written: u64,
}

impl AnalysisRing {
    fn new(capacity: usize) -> Self {
        Self {
            buf: VecDeque::with_capacity(capacity),
            capacity,
            written: 0,
        }
    }

    pub fn push(&mut self, sample: f32) {
        if self.buf.len() == self.capacity {
            self.buf.pop_front();
        }
        self.buf.push_back(sample);
        self.written += 1;
    }

    pub fn clear(&mut self) {
        self.buf.clear();
        self.written = 0;
    }
}

/// Produces one `AnalysisSnapshot` per processing tick from the live signal.
///
/// A tick becomes available once a full hop (`bin_count` samples) of new
/// audio has arrived, so the cadence is set by the audio pipeline's own
/// buffering. There is no smoothing between snapshots: each one reflects
/// only the most recent window.
pub struct SampleAnalyzer {
    transform_size: usize,
    ring: Arc<Mutex<AnalysisRing>>,
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    consumed: u64,
}

impl SampleAnalyzer {
    pub fn new(transform_size: usize) -> Self {
        let mut planner = FftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(transform_size);
        Self {
            transform_size,
            ring: Arc::new(Mutex::new(AnalysisRing::new(transform_size))),
            fft,
            window: hann_window(transform_size),
            consumed: 0,
        }
    }

    pub fn bin_count(&self) -> usize {
        self.transform_size / 2
    }

    /// Handle for the playback callback to feed mono samples into.
    pub fn ring(&self) -> Arc<Mutex<AnalysisRing>> {
        Arc::clone(&self.ring)
    }

    /// Discard accumulated signal. Called on session teardown so a new
    /// track does not analyse the tail of the previous one.
    pub fn reset(&mut self) {
        self.ring.lock().unwrap().clear();
        self.consumed = 0;
    }

    /// Produce a snapshot if a full hop of new samples has accumulated
    /// since the last one. Returns `None` otherwise.
    pub fn try_snapshot(&mut self) -> Option<AnalysisSnapshot> {
        let hop = self.bin_count() as u64;

        let window_samples: Vec<f32> = {
            let ring = self.ring.lock().unwrap();
            if ring.buf.len() < self.transform_size || ring.written < self.consumed + hop {
                return None;
            }
            self.consumed = ring.written;
            ring.buf.iter().copied().collect()
        };

        let bin_count = self.bin_count();

        // Most recent half-window, byte-scaled around the 128 centerline.
        let time_domain: Vec<u8> = window_samples[self.transform_size - bin_count..]
            .iter()
            .map(|&x| (128.0 * (1.0 + x)).clamp(0.0, 255.0) as u8)
            .collect();

        let mut buffer: Vec<Complex<f32>> = window_samples
            .iter()
            .zip(self.window.iter())
            .map(|(&s, &w)| Complex::new(s * w, 0.0))
            .collect();
        self.fft.process(&mut buffer);

        let frequency: Vec<u8> = buffer[..bin_count]
            .iter()
            .map(|c| {
                let magnitude = c.norm() / self.transform_size as f32;
                let db = 20.0 * magnitude.max(f32::MIN_POSITIVE).log10();
                let scaled = 255.0 * (db - MIN_DECIBELS) / (MAX_DECIBELS - MIN_DECIBELS);
                scaled.clamp(0.0, 255.0) as u8
            })
            .collect();

        Some(AnalysisSnapshot {
            time_domain,
            frequency,
        })
    }
}

fn hann_window(size: usize) -> Vec<f32> {
    (0..size)
        .map(|i| 0.5 * (1.0 - (2.0 * std::f32::consts::PI * i as f32 / (size - 1) as f32).cos()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIZE: usize = 1024;

    fn feed(analyzer: &SampleAnalyzer, samples: impl IntoIterator<Item = f32>) {
        let ring = analyzer.ring();
        let mut ring = ring.lock().unwrap();
        for s in samples {
            ring.push(s);
        }
    }

    #[test]
    fn no_snapshot_until_window_is_full() {
        let mut analyzer = SampleAnalyzer::new(SIZE);
        feed(&analyzer, std::iter::repeat(0.0).take(SIZE - 1));
        assert!(analyzer.try_snapshot().is_none());
        feed(&analyzer, std::iter::once(0.0));
        assert!(analyzer.try_snapshot().is_some());
    }

    #[test]
    fn snapshots_are_gated_on_a_full_hop() {
        let mut analyzer = SampleAnalyzer::new(SIZE);
        feed(&analyzer, std::iter::repeat(0.0).take(SIZE));
        assert!(analyzer.try_snapshot().is_some());

        // Less than one hop of fresh samples: no new tick.
        feed(&analyzer, std::iter::repeat(0.0).take(SIZE / 2 - 1));
        assert!(analyzer.try_snapshot().is_none());
        feed(&analyzer, std::iter::once(0.0));
        assert!(analyzer.try_snapshot().is_some());
    }

    #[test]
    fn silence_maps_to_centerline_and_zero_magnitudes() {
        let mut analyzer = SampleAnalyzer::new(SIZE);
        feed(&analyzer, std::iter::repeat(0.0).take(SIZE));
        let snap = analyzer.try_snapshot().unwrap();

        assert_eq!(snap.time_domain.len(), SIZE / 2);
        assert_eq!(snap.frequency.len(), SIZE / 2);
        assert!(snap.time_domain.iter().all(|&b| b == 128));
        assert!(snap.frequency.iter().all(|&b| b == 0));
    }

    #[test]
    fn time_domain_bytes_clamp_at_full_scale() {
        let mut analyzer = SampleAnalyzer::new(SIZE);
        feed(&analyzer, std::iter::repeat(1.5).take(SIZE));
        let snap = analyzer.try_snapshot().unwrap();
        assert!(snap.time_domain.iter().all(|&b| b == 255));

        analyzer.reset();
        feed(&analyzer, std::iter::repeat(-1.5).take(SIZE));
        let snap = analyzer.try_snapshot().unwrap();
        assert!(snap.time_domain.iter().all(|&b| b == 0));
    }

    #[test]
    fn sine_peaks_in_its_own_bin() {
        let mut analyzer = SampleAnalyzer::new(SIZE);
        let bin = 32usize;
        feed(
            &analyzer,
            (0..SIZE).map(|i| {
                (i as f32 * bin as f32 * std::f32::consts::TAU / SIZE as f32).sin() * 0.5
            }),
        );
        let snap = analyzer.try_snapshot().unwrap();

        let peak = snap.frequency[bin];
        assert!(peak > 200, "peak byte was {}", peak);
        assert!(snap.frequency[bin + 16] < peak / 4);
        assert!(snap.frequency[bin.saturating_sub(16)] < peak / 4);
    }

    #[test]
    fn reset_discards_accumulated_signal() {
        let mut analyzer = SampleAnalyzer::new(SIZE);
        feed(&analyzer, std::iter::repeat(0.25).take(SIZE));
        analyzer.reset();
        assert!(analyzer.try_snapshot().is_none());
    }
}
