use std::fmt::{Display, Formatter};

use anyhow::Result;
use rand::rngs::StdRng;

use ql::prelude::{Action, Environment, ModelActionType, QlError};

use crate::environment::breakout::config::BreakoutConfig;
use crate::environment::breakout::discretizer::{BreakoutObservation, StateDiscretizer};
use crate::environment::breakout::mechanics::{BreakoutMechanics, PaddleControl};

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum BreakoutAction {
    None,
    Left,
    Right,
}

impl Action for BreakoutAction {
    const ACTION_SPACE: ModelActionType = 3;

    fn numeric(&self) -> ModelActionType {
        match self {
            BreakoutAction::None => 0,
            BreakoutAction::Left => 1,
            BreakoutAction::Right => 2,
        }
    }

    fn try_from_numeric(value: ModelActionType) -> Result<Self> {
        match value {
            0 => Ok(BreakoutAction::None),
            1 => Ok(BreakoutAction::Left),
            2 => Ok(BreakoutAction::Right),
            _ => Err(QlError(format!("value {} out of range", value)).into()),
        }
    }
}

impl Display for BreakoutAction {
    fn fmt(
        &self,
        f: &mut Formatter<'_>,
    ) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl From<BreakoutAction> for PaddleControl {
    fn from(action: BreakoutAction) -> Self {
        match action {
            BreakoutAction::None => PaddleControl::Stay,
            BreakoutAction::Left => PaddleControl::Left,
            BreakoutAction::Right => PaddleControl::Right,
        }
    }
}

pub struct BreakoutEnvironment {
    mechanics: BreakoutMechanics,
    discretizer: StateDiscretizer,
    rng: StdRng,
}

impl BreakoutEnvironment {
    pub fn new(
        config: BreakoutConfig,
        mut rng: StdRng,
    ) -> Result<Self> {
        config.validate()?;
        let discretizer = StateDiscretizer::new(&config);
        let mechanics = BreakoutMechanics::new(config, &mut rng);
        Ok(Self {
            mechanics,
            discretizer,
            rng,
        })
    }

    /// Game situation after the latest step
    pub fn mechanics(&self) -> &BreakoutMechanics { &self.mechanics }

    /// For setting up specific game situations
    pub fn mechanics_mut(&mut self) -> &mut BreakoutMechanics { &mut self.mechanics }
}

impl Environment for BreakoutEnvironment {
    type S = BreakoutObservation;
    type A = BreakoutAction;

    fn reset(&mut self) -> Self::S {
        let config = self.mechanics.config().clone();
        self.mechanics = BreakoutMechanics::new(config, &mut self.rng);
        self.state()
    }

    fn state(&self) -> Self::S {
        self.discretizer.observe(&self.mechanics)
    }

    fn step(
        &mut self,
        action: Self::A,
    ) -> (Self::S, f32, bool) {
        let outcome = self.mechanics.time_step(action.into(), &mut self.rng);
        (self.state(), outcome.reward, outcome.done)
    }

    fn state_shape(&self) -> &[usize] {
        self.discretizer.state_shape()
    }

    fn score(&self) -> u32 { self.mechanics.score }

    fn lives(&self) -> u32 { self.mechanics.lives }
}
