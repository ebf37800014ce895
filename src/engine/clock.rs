/// Timing snapshot for one executed frame
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FrameTime {
    /// milliseconds since the previous executed frame, 0 on the first
    pub delta_ms: f64,
    /// host timestamp of this frame in milliseconds
    pub timestamp: f64,
    pub frame_index: u64,
}

/// Turns host frame timestamps into clamped deltas.
/// - the host gives no interval guarantee, a backgrounded tab can stall for
///   seconds, so deltas are capped at `max_delta_ms`
/// - timestamps going backwards count as a zero delta
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Option<f64>,
    frame_index: u64,
    max_delta_ms: f64,
}

impl FrameClock {
    pub fn new(max_delta_ms: f64) -> Self {
        FrameClock {
            last: None,
            frame_index: 0,
            max_delta_ms: max_delta_ms.max(0.0),
        }
    }

    /// Forgets the previous timestamp, the next tick reports a zero delta
    pub fn reset(&mut self) {
        self.last = None;
    }

    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    pub fn tick(&mut self, timestamp: f64) -> FrameTime {
        let delta_ms = match self.last {
            Some(last) => (timestamp - last).clamp(0.0, self.max_delta_ms),
            None => 0.0,
        };
        self.last = Some(timestamp);
        self.frame_index += 1;

        FrameTime {
            delta_ms,
            timestamp,
            frame_index: self.frame_index,
        }
    }
}
