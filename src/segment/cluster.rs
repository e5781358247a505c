// Temporal clustering of voiced frames
// Single left-to-right pass splitting on gaps, pitch jumps and pitch spread

use crate::pitch::VoicedFrame;

/// Running mean/variance of cluster pitches (Welford)
#[derive(Debug, Clone, Copy, Default)]
struct PitchStats {
    count: usize,
    mean: f64,
    m2: f64,
}

impl PitchStats {
    /// Statistics after adding one more pitch; `self` is left untouched
    fn with(self, pitch: f64) -> Self {
        let count = self.count + 1;
        let delta = pitch - self.mean;
        let mean = self.mean + delta / count as f64;
        let m2 = self.m2 + delta * (pitch - mean);
        PitchStats { count, mean, m2 }
    }

    /// Sample standard deviation (n - 1 divisor), 0 for one member or fewer
    fn std_dev(&self) -> f64 {
        if self.count <= 1 {
            return 0.0;
        }
        (self.m2.max(0.0) / (self.count - 1) as f64).sqrt()
    }
}

/// A run of voiced frames believed to be one note
#[derive(Debug, Clone)]
pub struct NoteCluster {
    frames: Vec<VoicedFrame>,
    stats: PitchStats,
}

impl NoteCluster {
    fn start(frame: VoicedFrame) -> Self {
        NoteCluster {
            frames: vec![frame],
            stats: PitchStats::default().with(frame.pitch_semitone),
        }
    }

    /// Frames of the cluster in time order (never empty)
    pub fn frames(&self) -> &[VoicedFrame] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn first(&self) -> &VoicedFrame {
        &self.frames[0]
    }

    pub fn last(&self) -> &VoicedFrame {
        &self.frames[self.frames.len() - 1]
    }

    /// Sample standard deviation of the cluster's pitches
    pub fn pitch_std_dev(&self) -> f64 {
        self.stats.std_dev()
    }
}

/// Thresholds used while clustering
#[derive(Debug, Clone, Copy)]
pub struct ClusterLimits {
    pub max_gap_seconds: f64,
    pub max_jump_semitones: f64,
    pub max_std_dev_semitones: f64,
}

/// Partition voiced frames into note clusters
///
/// Algorithm:
/// 1. Compare each frame with the last frame of the open cluster
/// 2. A gap above `max_gap_seconds` or a jump above `max_jump_semitones` closes it
/// 3. Otherwise the frame is appended only if the cluster's pitch standard deviation
///    stays within `max_std_dev_semitones`; if not, the cluster closes without it
/// 4. Any frame that closes a cluster opens the next one
pub fn cluster_frames(frames: &[VoicedFrame], limits: &ClusterLimits) -> Vec<NoteCluster> {
    let mut clusters = Vec::new();
    let mut current: Option<NoteCluster> = None;

    for &frame in frames {
        let Some(cluster) = current.as_mut() else {
            current = Some(NoteCluster::start(frame));
            continue;
        };

        let last = *cluster.last();
        let gap = frame.time - last.time;
        let jump = (frame.pitch_semitone - last.pitch_semitone).abs();

        let continues = if gap > limits.max_gap_seconds || jump > limits.max_jump_semitones {
            false
        } else {
            let tentative = cluster.stats.with(frame.pitch_semitone);
            if tentative.std_dev() > limits.max_std_dev_semitones {
                false
            } else {
                cluster.frames.push(frame);
                cluster.stats = tentative;
                true
            }
        };

        if !continues {
            if let Some(closed) = current.replace(NoteCluster::start(frame)) {
                clusters.push(closed);
            }
        }
    }

    if let Some(closed) = current {
        clusters.push(closed);
    }

    clusters
}
