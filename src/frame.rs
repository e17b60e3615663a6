use std::time::Instant;

/// Seconds between FPS figure refreshes
const FPS_UPDATE_INTERVAL: f32 = 1.0;

/// Frame metadata - carries frame number and timing info
#[derive(Debug, Clone, Copy)]
pub struct FrameInfo {
    pub number: u64,
    pub time: f32,
    pub delta: f32,
}

/// Stamps frames with number/time/delta and keeps a smoothed FPS figure
/// for the overlay.
pub struct FrameClock {
    frame_number: u64,
    start_time: Instant,
    last_frame_time: Instant,
    fps: f32,
    accum_frames: u32,
    accum_time: f32,
}

impl FrameClock {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            frame_number: 0,
            start_time: now,
            last_frame_time: now,
            fps: 0.0,
            accum_frames: 0,
            accum_time: 0.0,
        }
    }

    /// Advance to the next frame, returning its stamp.
    pub fn tick(&mut self) -> FrameInfo {
        let now = Instant::now();
        let delta = now.duration_since(self.last_frame_time).as_secs_f32();
        let time = now.duration_since(self.start_time).as_secs_f32();
        self.last_frame_time = now;

        self.accum_frames += 1;
        self.accum_time += delta;
        if self.accum_time >= FPS_UPDATE_INTERVAL {
            self.fps = self.accum_frames as f32 / self.accum_time;
            self.accum_frames = 0;
            self.accum_time = 0.0;
        }

        let info = FrameInfo {
            number: self.frame_number,
            time,
            delta,
        };
        self.frame_number += 1;
        info
    }

    pub fn fps(&self) -> f32 {
        self.fps
    }

    pub fn frame_number(&self) -> u64 {
        self.frame_number
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_numbers_frames_from_zero() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.tick().number, 0);
        assert_eq!(clock.tick().number, 1);
        assert_eq!(clock.frame_number(), 2);
    }

    #[test]
    fn test_time_is_monotonic() {
        let mut clock = FrameClock::new();
        let a = clock.tick();
        let b = clock.tick();
        assert!(b.time >= a.time);
        assert!(b.delta >= 0.0);
    }
}
