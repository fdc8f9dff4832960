use ql::prelude::DiscreteState;

use crate::environment::breakout::config::BreakoutConfig;
use crate::environment::breakout::mechanics::BreakoutMechanics;

/// Discretized Breakout state: `[ball_x, ball_y, ball_dx, ball_dy, paddle_x]` bins
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BreakoutObservation {
    indices: [usize; 5],
}

impl BreakoutObservation {
    pub fn ball_x_bin(&self) -> usize { self.indices[0] }

    pub fn ball_y_bin(&self) -> usize { self.indices[1] }

    /// 0: moving left, 1: moving right
    pub fn ball_dx_bin(&self) -> usize { self.indices[2] }

    /// 0: moving up, 1: moving down
    pub fn ball_dy_bin(&self) -> usize { self.indices[3] }

    pub fn paddle_x_bin(&self) -> usize { self.indices[4] }
}

impl DiscreteState for BreakoutObservation {
    fn indices(&self) -> &[usize] {
        &self.indices
    }
}

/// Maps the continuous game situation into a small grid of bins
#[derive(Clone, Debug)]
pub struct StateDiscretizer {
    width: f32,
    height: f32,
    state_shape: [usize; 5],
}

impl StateDiscretizer {
    pub fn new(config: &BreakoutConfig) -> Self {
        Self {
            width: config.width,
            height: config.height,
            state_shape: [config.bins.ball_x, config.bins.ball_y, 2, 2, config.bins.paddle_x],
        }
    }

    pub fn state_shape(&self) -> &[usize] { &self.state_shape }

    pub fn discretize(
        &self,
        ball_x: f32,
        ball_y: f32,
        paddle_x: f32,
        dx: f32,
        dy: f32,
    ) -> BreakoutObservation {
        let [bins_bx, bins_by, _, _, bins_px] = self.state_shape;
        BreakoutObservation {
            indices: [
                bin(ball_x, self.width, bins_bx),
                bin(ball_y, self.height, bins_by),
                direction_bin(dx),
                direction_bin(dy),
                bin(paddle_x, self.width, bins_px),
            ],
        }
    }

    pub fn observe(
        &self,
        mechanics: &BreakoutMechanics,
    ) -> BreakoutObservation {
        let ball = &mechanics.ball;
        self.discretize(
            ball.shape.center.x,
            ball.shape.center.y,
            mechanics.paddle.center_x,
            ball.direction.x,
            ball.direction.y,
        )
    }
}

/// `floor(coord / (extent / bins))`, clamped into `0..bins`
fn bin(
    coord: f32,
    extent: f32,
    bins: usize,
) -> usize {
    let bin = (coord / (extent / bins as f32)).floor();
    if bin.is_nan() || bin < 0.0 {
        0
    } else {
        (bin as usize).min(bins - 1)
    }
}

fn direction_bin(d: f32) -> usize {
    if d < 0.0 { 0 } else { 1 }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(0.0, 0)]
    #[case(79.99, 0)]
    #[case(80.0, 1)]
    #[case(200.0, 2)]
    #[case(399.99, 4)]
    #[case(400.0, 4)]
    #[case(450.0, 4)]
    #[case(- 3.0, 0)]
    #[case(f32::NAN, 0)]
    fn test_bin(
        #[case] coord: f32,
        #[case] expected: usize,
    ) {
        assert_eq!(bin(coord, 400.0, 5), expected);
    }

    #[rstest]
    #[case(- 1.0, 0)]
    #[case(- 0.0, 1)]
    #[case(1.0, 1)]
    fn test_direction_bin(
        #[case] d: f32,
        #[case] expected: usize,
    ) {
        assert_eq!(direction_bin(d), expected);
    }

    #[rstest]
    #[case(BreakoutConfig::default())]
    #[case(BreakoutConfig::smooth())]
    #[case(BreakoutConfig::classic())]
    fn test_indices_stay_within_shape(#[case] config: BreakoutConfig) {
        let discretizer = StateDiscretizer::new(&config);
        let shape = discretizer.state_shape().to_vec();
        let (w, h) = (config.width, config.height);
        for x in [-10.0, 0.0, 0.5 * w, w - 0.001, w, w + 10.0] {
            for y in [-10.0, 0.0, 0.5 * h, h - 0.001, h, h + 10.0] {
                for (dx, dy) in [(-1.0, -1.0), (1.0, 1.0)] {
                    let observation = discretizer.discretize(x, y, x, dx, dy);
                    for (i, (&idx, &dim)) in observation.indices().iter().zip(shape.iter()).enumerate() {
                        assert!(idx < dim, "dimension {}: {} out of {} at ({}, {})", i, idx, dim, x, y);
                    }
                }
            }
        }
    }

    #[test]
    fn test_observe() {
        let config = BreakoutConfig::default();
        let discretizer = StateDiscretizer::new(&config);
        assert_eq!(discretizer.state_shape(), &[5, 5, 2, 2, 5]);

        let mechanics = BreakoutMechanics::new(config, &mut StdRng::seed_from_u64(1));
        let observation = discretizer.observe(&mechanics);
        // center of the field, falling
        assert_eq!(observation.ball_x_bin(), 2);
        assert_eq!(observation.ball_y_bin(), 2);
        assert_eq!(observation.ball_dy_bin(), 1);
        assert_eq!(observation.paddle_x_bin(), 2);
        assert_eq!(observation.ball_dx_bin(), if mechanics.ball.direction.x < 0.0 { 0 } else { 1 });
    }
}
