use std::fmt::{Debug, Display, Formatter};
use std::hash::Hash;

use anyhow::Result;
use console_engine::screen::Screen;

/// Data type we use to encode an `Action` as an index into the value table.
pub type ModelActionType = u8;

pub trait Action: Display + Debug + Sized + Clone + Copy + Hash + PartialEq + Eq {
    /// Number of possible actions
    const ACTION_SPACE: ModelActionType;
    /// Identifying the Action as a unique value in range (0..Self::ACTION_SPACE)
    fn numeric(&self) -> ModelActionType;
    fn try_from_numeric(value: ModelActionType) -> Result<Self>;
}

/// A state, which is already quantized into a fixed-length tuple of bin indices.
///
/// The tuple must stay inside the shape announced by [Environment::state_shape] -
/// every index `i` in `0..shape[i]`.
pub trait DiscreteState: Clone + Debug {
    fn indices(&self) -> &[usize];
}

/// Learning environment, modeling the world of a learning agent
pub trait Environment {
    type S: DiscreteState;
    type A: Action;

    /// Resets the environment to a defined starting point and returns the initial state
    fn reset(&mut self) -> Self::S;

    /// Current state
    fn state(&self) -> Self::S;

    /// Performs one time/action-step.
    ///
    /// Applies the given `action` to the environment and returns:
    ///   - next state
    ///   - immediate reward earned during performing that step
    ///   - done flag (e.g. game ended)
    ///
    fn step(
        &mut self,
        action: Self::A,
    ) -> (Self::S, f32, bool);

    /// Number of bins per state dimension; the value table is shaped `state_shape + [A::ACTION_SPACE]`
    fn state_shape(&self) -> &[usize];

    /// Game specific score at the current point of the episode (informational only)
    fn score(&self) -> u32 { 0 }

    /// Remaining lives at the current point of the episode (informational only)
    fn lives(&self) -> u32 { 0 }
}

pub trait DebugVisualizer {
    fn one_line_info(&self) -> String;
    fn render_to_console(&self) -> Screen;
}

#[derive(Debug)]
pub struct QlError(pub String);

impl QlError {
    pub fn from(msg: &str) -> Self { QlError(msg.to_string()) }
}

impl Display for QlError {
    fn fmt(
        &self,
        f: &mut Formatter<'_>,
    ) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for QlError {}
