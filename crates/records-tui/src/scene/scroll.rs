use std::time::{Duration, Instant};

/// A release later than this after the last drag sample does not fling.
pub const RELEASE_WINDOW: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy)]
struct DragSample {
    y: f32,
    at: Instant,
}

/// Camera offset along the stack, with drag inertia.
///
/// The offset stays inside `[min, max]` after every operation.
#[derive(Debug, Clone)]
pub struct ScrollState {
    offset: f32,
    velocity: f32,
    min: f32,
    max: f32,
    drag: Option<DragSample>,
}

impl ScrollState {
    pub fn new(min: f32, max: f32) -> Self {
        Self {
            offset: min,
            velocity: 0.0,
            min,
            max: max.max(min),
            drag: None,
        }
    }

    pub fn offset(&self) -> f32 {
        self.offset
    }

    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    pub fn bounds(&self) -> (f32, f32) {
        (self.min, self.max)
    }

    /// Wheel input: `delta` is already scaled to stack units. Cancels inertia.
    pub fn wheel(&mut self, delta: f32) {
        self.velocity = 0.0;
        self.offset = self.clamp(self.offset + delta);
    }

    pub fn drag_start(&mut self, y: f32, now: Instant) {
        self.velocity = 0.0;
        self.drag = Some(DragSample { y, at: now });
    }

    /// Pointer moved to `y` while held. Moving up (smaller `y`) scrolls
    /// forward through the stack. The measured velocity is capped at
    /// `max_velocity` so closely stamped samples cannot fling the stack.
    pub fn drag_move(&mut self, y: f32, now: Instant, sensitivity: f32, max_velocity: f32) {
        let Some(prev) = self.drag else {
            return;
        };
        let delta = (prev.y - y) * sensitivity;
        self.offset = self.clamp(self.offset + delta);

        let elapsed = now.saturating_duration_since(prev.at).as_secs_f32();
        if elapsed > 0.0 {
            let limit = max_velocity.abs();
            self.velocity = (delta / elapsed).clamp(-limit, limit);
        }
        self.drag = Some(DragSample { y, at: now });
    }

    /// Release at `now`. The last measured velocity carries on as inertia
    /// unless the pointer was held still for longer than `RELEASE_WINDOW`.
    pub fn drag_end(&mut self, now: Instant) {
        if let Some(last) = self.drag.take() {
            if now.saturating_duration_since(last.at) > RELEASE_WINDOW {
                self.velocity = 0.0;
            }
        }
    }

    /// Advance inertia by `dt` seconds. Returns whether the offset moved.
    pub fn tick(&mut self, dt: f32, friction: f32, stop_velocity: f32) -> bool {
        if self.drag.is_some() || self.velocity == 0.0 {
            return false;
        }

        let before = self.offset;
        let next = self.offset + self.velocity * dt;
        self.offset = self.clamp(next);

        if self.offset != next {
            self.velocity = 0.0;
        } else {
            self.velocity *= friction;
            if self.velocity.abs() < stop_velocity {
                self.velocity = 0.0;
            }
        }
        self.offset != before
    }

    fn clamp(&self, value: f32) -> f32 {
        if value.is_nan() {
            return self.min;
        }
        value.clamp(self.min, self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    const MAX_VELOCITY: f32 = 6.0;

    #[test]
    fn test_starts_at_min() {
        let scroll = ScrollState::new(0.5, 3.0);
        assert_eq!(scroll.offset(), 0.5);
        // Inverted bounds collapse to a single point
        assert_eq!(ScrollState::new(1.0, 0.0).bounds(), (1.0, 1.0));
    }

    #[test]
    fn test_wheel_clamps() {
        let mut scroll = ScrollState::new(0.0, 2.0);
        scroll.wheel(1.5);
        assert_eq!(scroll.offset(), 1.5);
        scroll.wheel(10.0);
        assert_eq!(scroll.offset(), 2.0);
        scroll.wheel(-100.0);
        assert_eq!(scroll.offset(), 0.0);
    }

    #[test]
    fn test_drag_moves_against_pointer_and_measures_velocity() {
        let mut scroll = ScrollState::new(0.0, 10.0);
        let t0 = Instant::now();
        scroll.drag_start(20.0, t0);
        scroll.drag_move(15.0, t0 + Duration::from_millis(100), 0.1, MAX_VELOCITY);

        assert!((scroll.offset() - 0.5).abs() < 1e-5);
        assert!((scroll.velocity() - 5.0).abs() < 1e-3);
        // Held pointer: no inertia
        assert!(!scroll.tick(0.1, 0.95, 0.01));
    }

    #[test]
    fn test_inertia_decays_to_rest() {
        let mut scroll = ScrollState::new(0.0, 100.0);
        let t0 = Instant::now();
        scroll.drag_start(10.0, t0);
        scroll.drag_move(0.0, t0 + Duration::from_millis(50), 0.1, MAX_VELOCITY);
        scroll.drag_end(t0 + Duration::from_millis(60));

        let released_at = scroll.offset();
        let mut ticks = 0;
        while scroll.velocity() != 0.0 {
            scroll.tick(1.0 / 30.0, 0.95, 0.01);
            ticks += 1;
            assert!(ticks < 1000, "inertia never stopped");
        }
        assert!(scroll.offset() > released_at);
    }

    #[test]
    fn test_inertia_stops_at_bound() {
        let mut scroll = ScrollState::new(0.0, 1.0);
        let t0 = Instant::now();
        scroll.drag_start(10.0, t0);
        scroll.drag_move(0.0, t0 + Duration::from_millis(10), 0.05, MAX_VELOCITY);
        scroll.drag_end(t0 + Duration::from_millis(20));

        for _ in 0..100 {
            scroll.tick(1.0 / 30.0, 0.95, 0.01);
        }
        assert_eq!(scroll.offset(), 1.0);
        assert_eq!(scroll.velocity(), 0.0);
    }

    #[test]
    fn test_closely_stamped_samples_are_capped() {
        let mut scroll = ScrollState::new(0.0, 80.0);
        let t0 = Instant::now();
        scroll.drag_start(20.0, t0);
        scroll.drag_move(19.0, t0 + Duration::from_micros(50), 0.12, MAX_VELOCITY);
        assert_eq!(scroll.velocity(), MAX_VELOCITY);

        scroll.drag_end(t0 + Duration::from_millis(1));
        scroll.tick(1.0 / 30.0, 0.95, 0.01);
        assert!(scroll.offset() < 0.12 + MAX_VELOCITY / 30.0 + 1e-4);
    }

    #[test]
    fn test_release_after_hold_does_not_fling() {
        let mut scroll = ScrollState::new(0.0, 100.0);
        let t0 = Instant::now();
        scroll.drag_start(10.0, t0);
        scroll.drag_move(0.0, t0 + Duration::from_millis(50), 0.1, MAX_VELOCITY);
        assert!(scroll.velocity() > 0.0);

        scroll.drag_end(t0 + Duration::from_millis(50) + RELEASE_WINDOW * 3);
        let held_at = scroll.offset();
        assert_eq!(scroll.velocity(), 0.0);
        assert!(!scroll.tick(1.0 / 30.0, 0.95, 0.01));
        assert_eq!(scroll.offset(), held_at);
    }

    #[test]
    fn test_wheel_cancels_inertia() {
        let mut scroll = ScrollState::new(0.0, 100.0);
        let t0 = Instant::now();
        scroll.drag_start(10.0, t0);
        scroll.drag_move(0.0, t0 + Duration::from_millis(50), 0.1, MAX_VELOCITY);
        scroll.drag_end(t0 + Duration::from_millis(60));
        scroll.wheel(0.1);
        assert_eq!(scroll.velocity(), 0.0);
    }

    #[test]
    fn test_offset_always_within_bounds() {
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..50 {
            let max = rng.gen_range(0.0..20.0);
            let mut scroll = ScrollState::new(0.0, max);
            let mut now = Instant::now();

            for _ in 0..200 {
                now += Duration::from_millis(rng.gen_range(0..40));
                match rng.gen_range(0..5) {
                    0 => scroll.wheel(rng.gen_range(-50.0..50.0)),
                    1 => scroll.drag_start(rng.gen_range(0.0..60.0), now),
                    2 => scroll.drag_move(rng.gen_range(-500.0..500.0), now, 0.12, MAX_VELOCITY),
                    3 => scroll.drag_end(now),
                    _ => {
                        scroll.tick(rng.gen_range(0.0..0.2), 0.95, 0.01);
                    }
                }
                let (min, max) = scroll.bounds();
                assert!(scroll.offset() >= min && scroll.offset() <= max);
            }
        }
    }
}
