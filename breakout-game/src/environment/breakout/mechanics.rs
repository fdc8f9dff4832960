use egui::{Pos2, Vec2};
use itertools::iproduct;
use rand::Rng;

use crate::environment::breakout::algebra_2d::{AaBB, Circle};
use crate::environment::breakout::config::{BreakoutConfig, PaddleMotion};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameResult {
    Won,
    Lost,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PaddleControl {
    Stay,
    Left,
    Right,
}

/// What happened during one time step
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StepOutcome {
    pub reward: f32,
    pub paddle_hit: bool,
    pub brick_hit: bool,
    pub ball_lost: bool,
    pub done: bool,
}

/// Breakout game state and rules.
///
/// Fixed time steps; the ball moves `ball_speed` per step on both axes, so its direction is
/// always one of the four diagonals. Collisions are tested on the position after the move.
/// A tick resolves at most one object collision: the paddle has priority over bricks, and of
/// several overlapping bricks only the first one (row-major order) is hit. Walls are always resolved.
#[derive(Clone, Debug)]
pub struct BreakoutMechanics {
    config: BreakoutConfig,
    pub bricks: Vec<Brick>,
    pub ball: Ball,
    pub paddle: Paddle,
    pub lives: u32,
    /// number of destroyed bricks
    pub score: u32,
    pub game_result: Option<GameResult>,
}

impl BreakoutMechanics {
    /// Initial game situation; expects a validated `config`
    pub fn new<R: Rng>(
        config: BreakoutConfig,
        rng: &mut R,
    ) -> Self {
        Self {
            bricks: Self::initial_bricks(&config),
            ball: Self::initial_ball(&config, rng),
            paddle: Self::initial_paddle(&config),
            lives: config.lives,
            score: 0,
            game_result: None,
            config,
        }
    }

    fn initial_bricks(config: &BreakoutConfig) -> Vec<Brick> {
        let size = Vec2::new(config.brick_width(), config.brick_height);
        iproduct!(0..config.brick_rows, 0..config.brick_cols)
            .map(|(row, col)| {
                let left_x = config.brick_gap + col as f32 * (size.x + config.brick_gap);
                let top_y = config.bricks_top_y + row as f32 * (size.y + config.brick_gap);
                Brick {
                    shape: AaBB::from_min_size(Pos2::new(left_x, top_y), size),
                }
            })
            .collect()
    }

    /// Ball in the center, falling towards the paddle in a random horizontal direction
    fn initial_ball<R: Rng>(
        config: &BreakoutConfig,
        rng: &mut R,
    ) -> Ball {
        let dx = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
        Ball {
            shape: Circle {
                center: Pos2::new(config.width / 2.0, config.height / 2.0),
                radius: config.ball_radius,
            },
            direction: Vec2::new(dx, 1.0),
            speed: config.ball_speed,
        }
    }

    fn initial_paddle(config: &BreakoutConfig) -> Paddle {
        Paddle {
            center_x: config.width / 2.0,
            top_y: config.paddle_top_y,
            size: Vec2::new(config.paddle_width, config.paddle_height),
        }
    }

    pub fn config(&self) -> &BreakoutConfig { &self.config }

    pub fn finished(&self) -> bool { self.game_result.is_some() }

    /// physically move one time step forward.
    ///
    /// A finished game does not change anymore; further steps report `done` without reward.
    pub fn time_step<R: Rng>(
        &mut self,
        control: PaddleControl,
        rng: &mut R,
    ) -> StepOutcome {
        let mut outcome = StepOutcome::default();
        if self.finished() {
            outcome.done = true;
            return outcome;
        }

        self.paddle.process_control(control, &self.config);
        self.ball.proceed();
        self.ball.reflect_at_walls(self.config.width);

        let ball_box = self.ball.shape.bounding_box();
        if self.ball.direction.y > 0.0 && ball_box.intersects(&self.paddle.shape()) {
            self.ball.bounce_off_paddle(&self.paddle, self.config.paddle_english);
            outcome.paddle_hit = true;
            outcome.reward += self.config.rewards.paddle_hit;
        } else if let Some(idx) = self.bricks.iter().position(|b| b.shape.intersects(&ball_box)) {
            let brick = self.bricks.remove(idx);
            log::trace!("brick hit at {:?}", brick.shape.min);
            self.ball.direction.y = -self.ball.direction.y;
            self.score += 1;
            outcome.brick_hit = true;
            outcome.reward += self.config.rewards.brick_hit;
        }

        if self.ball.shape.center.y > self.config.height {
            outcome.ball_lost = true;
            outcome.reward += self.config.rewards.ball_lost;
            self.lives = self.lives.saturating_sub(1);
            if self.lives > 0 {
                self.ball = Self::initial_ball(&self.config, rng);
            } else {
                self.game_result = Some(GameResult::Lost);
            }
        }

        if !self.finished() && self.bricks.is_empty() {
            outcome.reward += self.config.rewards.win;
            self.game_result = Some(GameResult::Won);
        }

        outcome.done = self.finished();
        outcome
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Brick {
    pub shape: AaBB,
}

/// A ball is a perfect round 2D structure
#[derive(Clone, Debug)]
pub struct Ball {
    pub shape: Circle,
    /// each component is either -1 or +1
    pub direction: Vec2,
    pub speed: f32,
}

impl Ball {
    fn proceed(&mut self) {
        self.shape.center += self.direction * self.speed;
    }

    fn reflect_at_walls(
        &mut self,
        width: f32,
    ) {
        let r = self.shape.radius;
        let center = &mut self.shape.center;
        if center.x <= r {
            center.x = r;
            self.direction.x = 1.0;
        } else if center.x >= width - r {
            center.x = width - r;
            self.direction.x = -1.0;
        }
        if center.y <= r {
            center.y = r;
            self.direction.y = 1.0;
        }
    }

    fn bounce_off_paddle(
        &mut self,
        paddle: &Paddle,
        english: bool,
    ) {
        self.direction.y = -self.direction.y;
        if english {
            let offset = self.shape.center.x - paddle.center_x;
            if offset != 0.0 {
                self.direction.x = offset.signum();
            }
        }
    }
}

#[derive(Clone, Debug)]
pub struct Paddle {
    pub center_x: f32,
    pub top_y: f32,
    pub size: Vec2,
}

impl Paddle {
    pub fn shape(&self) -> AaBB {
        AaBB::from_min_size(Pos2::new(self.center_x - self.size.x / 2.0, self.top_y), self.size)
    }

    fn process_control(
        &mut self,
        control: PaddleControl,
        config: &BreakoutConfig,
    ) {
        let direction = match control {
            PaddleControl::Stay => 0.0,
            PaddleControl::Left => -1.0,
            PaddleControl::Right => 1.0,
        };
        let delta = match config.paddle_motion {
            PaddleMotion::Jump => direction * config.paddle_speed,
            PaddleMotion::Smoothed { target_offset, factor } => {
                let target = self.center_x + direction * target_offset;
                ((target - self.center_x) * factor).clamp(-config.paddle_speed, config.paddle_speed)
            }
        };
        let half_width = self.size.x / 2.0;
        self.center_x = (self.center_x + delta).clamp(half_width, config.width - half_width);
    }
}

pub trait Assert {
    fn assert(&self);
}

impl Assert for BreakoutMechanics {
    fn assert(&self) {
        let config = &self.config;
        let half_width = self.paddle.size.x / 2.0;
        assert!(self.paddle.center_x >= half_width && self.paddle.center_x <= config.width - half_width);
        assert!(self.ball.direction.x.abs() == 1.0 && self.ball.direction.y.abs() == 1.0);
        let center = self.ball.shape.center;
        assert!(center.x >= 0.0 && center.x <= config.width);
        assert!(center.y >= 0.0);
        if self.game_result != Some(GameResult::Lost) {
            assert!(center.y <= config.height);
        }
        assert!(self.lives <= config.lives);
        assert_eq!(self.bricks.len() + self.score as usize, config.brick_rows * config.brick_cols);
    }
}
