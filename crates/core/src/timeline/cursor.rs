use scrollstage_protocol::{StyleCommand, Target, Transform};

use crate::config::CursorConfig;

/// Longest integration step. Larger frame gaps are split so a stalled tab
/// does not fling the follower off screen.
const MAX_STEP_S: f64 = 1.0 / 240.0;

/// Damped spring per axis.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Axis {
    position: f64,
    velocity: f64,
}

impl Axis {
    fn step(&mut self, target: f64, config: &CursorConfig, dt: f64) {
        let force = -config.stiffness * (self.position - target) - config.damping * self.velocity;
        self.velocity += force / config.mass * dt;
        self.position += self.velocity * dt;
    }

    fn at_rest(&self, target: f64, config: &CursorConfig) -> bool {
        (self.position - target).abs() < config.rest_delta && self.velocity.abs() < config.rest_speed
    }
}

/// Custom cursor that trails the pointer on a spring.
///
/// The pointer position is the target; each frame moves the follower by the
/// elapsed time. Before the first pointer move it waits off screen.
#[derive(Debug, Clone)]
pub struct CursorFollower {
    config: CursorConfig,
    target: (f64, f64),
    x: Axis,
    y: Axis,
}

impl CursorFollower {
    pub fn new(config: CursorConfig) -> Self {
        let start = Axis {
            position: config.start,
            velocity: 0.0,
        };
        Self {
            target: (config.start, config.start),
            x: start,
            y: start,
            config,
        }
    }

    /// Pointer position in viewport pixels. Non-finite coordinates are ignored.
    pub fn set_target(&mut self, x: f64, y: f64) {
        if x.is_finite() && y.is_finite() {
            self.target = (x, y);
        }
    }

    pub fn target(&self) -> (f64, f64) {
        self.target
    }

    pub fn position(&self) -> (f64, f64) {
        (self.x.position, self.y.position)
    }

    pub fn is_settled(&self) -> bool {
        self.x.at_rest(self.target.0, &self.config) && self.y.at_rest(self.target.1, &self.config)
    }

    /// Integrate `delta_s` seconds. Non-finite or non-positive deltas are
    /// dropped.
    pub fn advance(&mut self, delta_s: f64) {
        if !delta_s.is_finite() || delta_s <= 0.0 || self.is_settled() {
            return;
        }
        let steps = (delta_s / MAX_STEP_S).ceil().max(1.0);
        let dt = delta_s / steps;
        for _ in 0..steps as u64 {
            self.x.step(self.target.0, &self.config, dt);
            self.y.step(self.target.1, &self.config, dt);
        }
        if self.is_settled() {
            self.x = Axis {
                position: self.target.0,
                velocity: 0.0,
            };
            self.y = Axis {
                position: self.target.1,
                velocity: 0.0,
            };
        }
    }

    pub fn render(&self) -> Vec<StyleCommand> {
        let (x, y) = self.position();
        vec![StyleCommand::SetTransform {
            target: Target::CustomCursor,
            transform: Transform::at(x, y),
        }]
    }
}
