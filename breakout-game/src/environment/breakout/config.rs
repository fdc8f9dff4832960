use anyhow::Result;
use clap::ValueEnum;

use ql::prelude::QlError;

/// How a paddle control moves the paddle within one time step
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PaddleMotion {
    /// Moves by exactly `paddle_speed`
    Jump,
    /// Moves a `factor` of the way towards `x ± target_offset`, but never more than `paddle_speed`
    Smoothed { target_offset: f32, factor: f32 },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Rewards {
    pub paddle_hit: f32,
    pub brick_hit: f32,
    /// negative
    pub ball_lost: f32,
    pub win: f32,
}

/// Number of bins per discretized state dimension
#[derive(Clone, Debug, PartialEq)]
pub struct Bins {
    pub ball_x: usize,
    pub ball_y: usize,
    pub paddle_x: usize,
}

/// Ruleset of a Breakout game.
///
/// TOP / LEFT corner of the playfield is 0/0.
#[derive(Clone, Debug, PartialEq)]
pub struct BreakoutConfig {
    pub width: f32,
    pub height: f32,
    pub ball_radius: f32,
    /// distance per time step on each axis
    pub ball_speed: f32,
    pub paddle_width: f32,
    pub paddle_height: f32,
    /// upper edge of the paddle
    pub paddle_top_y: f32,
    pub paddle_speed: f32,
    pub paddle_motion: PaddleMotion,
    /// Steer the horizontal ball direction by the hit position on the paddle
    pub paddle_english: bool,
    pub brick_rows: usize,
    pub brick_cols: usize,
    pub brick_height: f32,
    pub brick_gap: f32,
    pub bricks_top_y: f32,
    pub lives: u32,
    pub rewards: Rewards,
    pub bins: Bins,
}

impl Default for BreakoutConfig {
    fn default() -> Self {
        let height = 500.0;
        Self {
            width: 400.0,
            height,
            ball_radius: 7.0,
            ball_speed: 5.0,
            paddle_width: 80.0,
            paddle_height: 12.0,
            paddle_top_y: height - 40.0,
            paddle_speed: 10.0,
            paddle_motion: PaddleMotion::Jump,
            paddle_english: true,
            brick_rows: 4,
            brick_cols: 7,
            brick_height: 18.0,
            brick_gap: 6.0,
            bricks_top_y: 60.0,
            lives: 3,
            rewards: Rewards {
                paddle_hit: 1.0,
                brick_hit: 10.0,
                ball_lost: -10.0,
                win: 50.0,
            },
            bins: Bins {
                ball_x: 5,
                ball_y: 5,
                paddle_x: 5,
            },
        }
    }
}

impl BreakoutConfig {
    /// Bigger field with a smoothly moving paddle and a finer state grid
    pub fn smooth() -> Self {
        let height = 700.0;
        Self {
            width: 600.0,
            height,
            paddle_width: 100.0,
            paddle_top_y: height - 40.0,
            paddle_speed: 6.0,
            paddle_motion: PaddleMotion::Smoothed {
                target_offset: 40.0,
                factor: 0.25,
            },
            brick_rows: 5,
            brick_cols: 8,
            brick_height: 25.0,
            lives: 1,
            rewards: Rewards {
                paddle_hit: 2.0,
                ball_lost: -20.0,
                ..Self::default().rewards
            },
            bins: Bins {
                ball_x: 8,
                ball_y: 8,
                paddle_x: 8,
            },
            ..Self::default()
        }
    }

    /// Small single-life field without paddle english.
    ///
    /// Speeds and paddle size of the bare 200x300 game; a small brick wall is added so that the game can be won.
    pub fn classic() -> Self {
        let height = 300.0;
        Self {
            width: 200.0,
            height,
            ball_radius: 5.0,
            ball_speed: 5.0,
            paddle_width: 40.0,
            paddle_height: 8.0,
            paddle_top_y: height - 20.0,
            paddle_speed: 10.0,
            paddle_english: false,
            brick_rows: 3,
            brick_cols: 5,
            brick_height: 10.0,
            brick_gap: 4.0,
            bricks_top_y: 30.0,
            lives: 1,
            ..Self::default()
        }
    }

    pub fn brick_width(&self) -> f32 {
        (self.width - (self.brick_cols + 1) as f32 * self.brick_gap) / self.brick_cols as f32
    }

    pub fn validate(&self) -> Result<()> {
        let fail = |msg: String| -> Result<()> { Err(QlError(msg).into()) };

        if !(self.width > 0.0 && self.height > 0.0) {
            return fail(format!("playfield {}x{} must have a positive size", self.width, self.height));
        }
        if !(self.ball_radius > 0.0 && self.ball_speed > 0.0 && 2.0 * self.ball_radius < self.width.min(self.height)) {
            return fail(format!("invalid ball (radius {}, speed {})", self.ball_radius, self.ball_speed));
        }
        if !(self.paddle_width > 0.0 && self.paddle_height > 0.0 && self.paddle_speed > 0.0) {
            return fail("paddle size and speed must be positive".to_string());
        }
        if self.paddle_width > self.width {
            return fail(format!("paddle width {} exceeds playfield width {}", self.paddle_width, self.width));
        }
        if !(self.paddle_top_y >= 0.0 && self.paddle_top_y + self.paddle_height <= self.height) {
            return fail(format!("paddle at y={} is outside the playfield", self.paddle_top_y));
        }
        if let PaddleMotion::Smoothed { target_offset, factor } = self.paddle_motion {
            if !(factor > 0.0 && factor <= 1.0) {
                return fail(format!("smoothing factor must be in (0, 1], got {}", factor));
            }
            if target_offset <= 0.0 {
                return fail(format!("smoothing target offset must be positive, got {}", target_offset));
            }
        }
        if self.brick_rows == 0 || self.brick_cols == 0 || !(self.brick_height > 0.0) || self.brick_gap < 0.0 {
            return fail("brick layout needs at least one brick with a positive height".to_string());
        }
        let bricks_bottom_y = self.bricks_top_y + self.brick_rows as f32 * (self.brick_height + self.brick_gap);
        if self.brick_width() <= 0.0 || self.bricks_top_y < 0.0 || bricks_bottom_y >= self.paddle_top_y {
            return fail(format!(
                "{}x{} bricks do not fit into the playfield above the paddle",
                self.brick_rows, self.brick_cols
            ));
        }
        if self.lives == 0 {
            return fail("at least one life required".to_string());
        }
        if self.bins.ball_x == 0 || self.bins.ball_y == 0 || self.bins.paddle_x == 0 {
            return fail(format!("bin counts must be positive, got {:?}", self.bins));
        }
        Ok(())
    }
}

/// Named rulesets, selectable on the command line
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Variant {
    Default,
    Smooth,
    Classic,
}

impl From<Variant> for BreakoutConfig {
    fn from(variant: Variant) -> Self {
        match variant {
            Variant::Default => BreakoutConfig::default(),
            Variant::Smooth => BreakoutConfig::smooth(),
            Variant::Classic => BreakoutConfig::classic(),
        }
    }
}
