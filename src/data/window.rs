//! Rolling window of fleet-average latency for the trend chart.

use std::collections::VecDeque;

use serde::Serialize;

/// Default number of refresh cycles kept in the window.
pub const DEFAULT_CAPACITY: usize = 20;

/// Fleet-average latency captured at one refresh.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatePoint {
    /// Wall-clock time of capture, formatted for display.
    pub label: String,
    pub value: f64,
}

/// Fixed-capacity FIFO of aggregate points, oldest first.
#[derive(Debug, Clone)]
pub struct RollingWindow {
    points: VecDeque<AggregatePoint>,
    capacity: usize,
}

impl Default for RollingWindow {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl RollingWindow {
    /// Create an empty window. A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            points: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Append a point, evicting the single oldest one if over capacity.
    pub fn push(&mut self, point: AggregatePoint) {
        self.points.push_back(point);
        if self.points.len() > self.capacity {
            self.points.pop_front();
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn latest(&self) -> Option<&AggregatePoint> {
        self.points.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AggregatePoint> {
        self.points.iter()
    }

    /// Labels in chronological order.
    pub fn labels(&self) -> Vec<String> {
        self.points.iter().map(|p| p.label.clone()).collect()
    }

    /// Values in chronological order.
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }
}
