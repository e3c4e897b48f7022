use egui_plot::PlotPoints;
use std::collections::VecDeque;

/// Downsampled history of the drive: speed readout over sim time and the
/// path driven, both bounded to a sliding window.
pub struct Trace {
    pub t: VecDeque<f64>,
    pub speed: VecDeque<f64>,
    pub px: VecDeque<f64>,
    pub py: VecDeque<f64>,
    sample_dt: f64,
    capacity: usize,
}

impl Trace {
    pub fn new(seconds: f64, sample_dt: f64) -> Self {
        let capacity = Self::capacity_for(seconds, sample_dt);
        Self {
            t: VecDeque::with_capacity(capacity),
            speed: VecDeque::with_capacity(capacity),
            px: VecDeque::with_capacity(capacity),
            py: VecDeque::with_capacity(capacity),
            sample_dt,
            capacity,
        }
    }

    fn capacity_for(seconds: f64, sample_dt: f64) -> usize {
        (seconds / sample_dt).ceil() as usize + 1
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn set_window_seconds(&mut self, seconds: f64) {
        self.capacity = Self::capacity_for(seconds, self.sample_dt);
        self.trim_to_capacity();
    }

    /// Records a sample if at least one sample interval has passed since the
    /// previous one. Returns whether it was kept.
    pub fn record(&mut self, t: f64, speed: f64, x: f64, y: f64) -> bool {
        if let Some(last) = self.t.back() {
            if t - last < self.sample_dt {
                return false;
            }
        }
        self.t.push_back(t);
        self.speed.push_back(speed);
        self.px.push_back(x);
        self.py.push_back(y);
        self.trim_to_capacity();
        true
    }

    pub fn clear(&mut self) {
        self.t.clear();
        self.speed.clear();
        self.px.clear();
        self.py.clear();
    }

    pub fn len(&self) -> usize {
        self.t.len()
    }

    pub fn latest_time(&self) -> f64 {
        self.t.back().copied().unwrap_or(0.0)
    }

    fn trim_to_capacity(&mut self) {
        let mut trim = |v: &mut VecDeque<f64>| {
            while v.len() > self.capacity {
                v.pop_front();
            }
        };
        trim(&mut self.t);
        trim(&mut self.speed);
        trim(&mut self.px);
        trim(&mut self.py);
    }

    pub fn line<'a>(points: &'a VecDeque<f64>, t: &'a VecDeque<f64>) -> PlotPoints<'a> {
        PlotPoints::from_iter(t.iter().copied().zip(points.iter().copied()).map(|(x, y)| [x, y]))
    }

    pub fn path(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.px.iter().copied().zip(self.py.iter().copied())
    }
}
