use std::marker::PhantomData;

use anyhow::Result;
use rand::rngs::StdRng;
use rand::Rng;

use crate::learn::q_table::QTable;
use crate::prelude::{Action, QlError};

#[derive(Clone, Debug)]
pub struct AgentParameter {
    /// Learning rate α; (0 < α <= 1) the fraction by which a value moves towards its new target
    pub alpha: f32,
    /// Discount rate; (0 <= 𝛾 <= 1) represents the value of future rewards. The bigger, the more farsighted the agent becomes
    pub gamma: f32,
    /// Initial epsilon greedy parameter
    pub epsilon_max: f32,
    /// Minimum epsilon greedy parameter
    pub epsilon_min: f32,
    /// Multiplicative epsilon decay, applied once per episode
    pub epsilon_decay: f32,
}

impl AgentParameter {
    /// Parameters for playing a learned table without any exploration
    pub fn greedy() -> Self {
        Self {
            epsilon_max: 0.0,
            epsilon_min: 0.0,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        let in_range = |v: f32, lower_exclusive: bool| v <= 1.0 && if lower_exclusive { v > 0.0 } else { v >= 0.0 };
        if !in_range(self.alpha, true) {
            return Err(QlError(format!("alpha must be in (0, 1], got {}", self.alpha)))?;
        }
        if !in_range(self.gamma, false) {
            return Err(QlError(format!("gamma must be in [0, 1], got {}", self.gamma)))?;
        }
        if !in_range(self.epsilon_max, false) || !in_range(self.epsilon_min, false) || self.epsilon_min > self.epsilon_max {
            return Err(QlError(format!(
                "epsilon bounds must satisfy 0 <= epsilon_min <= epsilon_max <= 1, got {} / {}",
                self.epsilon_min, self.epsilon_max
            )))?;
        }
        if !in_range(self.epsilon_decay, true) {
            return Err(QlError(format!("epsilon_decay must be in (0, 1], got {}", self.epsilon_decay)))?;
        }
        Ok(())
    }
}

impl Default for AgentParameter {
    fn default() -> Self {
        Self {
            alpha: 0.1,
            gamma: 0.9,
            epsilon_max: 1.0,
            epsilon_min: 0.05,
            epsilon_decay: 0.995,
        }
    }
}

/// Tabular Q-learning agent with an epsilon-greedy policy.
///
/// Owns its value table exclusively. States are passed in as bin-index tuples, which must fit the
/// table's state shape - anything else is a broken contract between environment and agent and panics.
pub struct QLearningAgent<A: Action> {
    param: AgentParameter,
    table: QTable,
    ///  Epsilon greedy parameter
    epsilon: f32,
    rng: StdRng,
    _action: PhantomData<A>,
}

impl<A: Action> QLearningAgent<A> {
    /// Agent with a zero-initialized table
    pub fn new(
        state_shape: &[usize],
        param: AgentParameter,
        rng: StdRng,
    ) -> Result<Self> {
        let table = QTable::new(state_shape, A::ACTION_SPACE)?;
        Self::with_table(table, state_shape, param, rng)
    }

    /// Agent continuing with an existing table; the table must be shaped `state_shape + [A::ACTION_SPACE]`
    pub fn with_table(
        table: QTable,
        state_shape: &[usize],
        param: AgentParameter,
        rng: StdRng,
    ) -> Result<Self> {
        param.validate()?;
        table.ensure_shape(state_shape, A::ACTION_SPACE)?;
        let epsilon = param.epsilon_max;
        Ok(Self {
            param,
            table,
            epsilon,
            rng,
            _action: PhantomData,
        })
    }

    /// Agent which always exploits the given table
    pub fn greedy(
        table: QTable,
        state_shape: &[usize],
        rng: StdRng,
    ) -> Result<Self> {
        Self::with_table(table, state_shape, AgentParameter::greedy(), rng)
    }

    pub fn epsilon(&self) -> f32 { self.epsilon }

    pub fn param(&self) -> &AgentParameter { &self.param }

    pub fn table(&self) -> &QTable { &self.table }

    pub fn into_table(self) -> QTable { self.table }

    /// Epsilon-greedy action selection
    ///
    /// # Panics
    /// When `state` does not fit the value table, also on exploration steps.
    pub fn choose_action(
        &mut self,
        state: &[usize],
    ) -> Result<A> {
        // bounds check, the exploration branch does not read the table
        self.table.row(state);
        if self.epsilon > 0.0 && self.rng.gen::<f32>() < self.epsilon {
            let a = self.rng.gen_range(0..A::ACTION_SPACE);
            A::try_from_numeric(a)
        } else {
            self.best_action(state)
        }
    }

    /// Greedy action; first maximum wins on ties
    pub fn best_action(
        &self,
        state: &[usize],
    ) -> Result<A> {
        A::try_from_numeric(self.table.best_action(state))
    }

    /// One-step Q-learning:
    /// `Q[s,a] ← (1-α)·Q[s,a] + α·(reward + 𝛾·max_a' Q[s',a'])`
    ///
    /// Also used for terminal transitions - the table has no terminal flag, so the bootstrapped value
    /// of `next_state` still gets discounted in.
    pub fn update(
        &mut self,
        state: &[usize],
        action: A,
        reward: f32,
        next_state: &[usize],
    ) {
        let target = reward + self.param.gamma * self.table.max_value(next_state);
        self.move_towards(state, action, target);
    }

    /// Update variant treating the transition as terminal: the target is the reward alone.
    pub fn update_terminal(
        &mut self,
        state: &[usize],
        action: A,
        reward: f32,
    ) {
        self.move_towards(state, action, reward);
    }

    /// Decay probability of taking random action; called once per finished episode
    pub fn decay_epsilon(&mut self) {
        self.epsilon = f32::max(self.epsilon * self.param.epsilon_decay, self.param.epsilon_min);
    }

    /// Forces full exploration, e.g. when no prior table could be loaded
    pub fn explore_fully(&mut self) {
        self.epsilon = 1.0;
    }

    fn move_towards(
        &mut self,
        state: &[usize],
        action: A,
        target: f32,
    ) {
        let a = action.numeric();
        let current = self.table.get(state, a);
        // same as (1-α)·current + α·target, but exact when current == target
        self.table.set(state, a, current + self.param.alpha * (target - current));
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rstest::rstest;

    use crate::test::ballgame_test_environment::BallGameAction;

    use super::*;

    const SHAPE: [usize; 2] = [3, 3];

    fn agent(param: AgentParameter) -> QLearningAgent<BallGameAction> {
        QLearningAgent::new(&SHAPE, param, StdRng::seed_from_u64(7)).unwrap()
    }

    #[test]
    fn test_update_moves_towards_target_by_alpha() {
        let mut agent = agent(AgentParameter::default());
        agent.table.set(&[1, 1], BallGameAction::East.numeric(), 4.0);
        agent.table.set(&[0, 0], BallGameAction::North.numeric(), 2.0);

        agent.update(&[0, 0], BallGameAction::North, 1.0, &[1, 1]);

        // target = 1 + 0.9 * 4 = 4.6 ; 2.0 + 0.1 * (4.6 - 2.0) = 2.26
        let v = agent.table.get(&[0, 0], BallGameAction::North.numeric());
        assert!((v - 2.26).abs() < 1e-5, "{v}");
    }

    #[test]
    fn test_update_fixed_point() {
        let mut agent = agent(AgentParameter::default());
        agent.table.set(&[2, 2], BallGameAction::West.numeric(), 10.0);
        agent.table.set(&[1, 2], BallGameAction::West.numeric(), 5.0);
        let before = agent.table.clone();

        // reward + 𝛾 * max Q[next] = -4 + 0.9 * 10 = 5 = Q[state, action]
        agent.update(&[1, 2], BallGameAction::West, -4.0, &[2, 2]);
        assert_eq!(agent.table, before);
    }

    #[test]
    fn test_repeated_update_converges_to_target() {
        let mut agent = agent(AgentParameter::default());
        let mut last_distance = f32::INFINITY;
        for _ in 0..200 {
            agent.update_terminal(&[0, 1], BallGameAction::South, 3.0);
            let distance = (3.0 - agent.table.get(&[0, 1], BallGameAction::South.numeric())).abs();
            assert!(distance <= last_distance);
            last_distance = distance;
        }
        assert!(last_distance < 1e-3);
    }

    #[test]
    fn test_update_touches_a_single_cell() {
        let mut agent = agent(AgentParameter::default());
        agent.update(&[1, 0], BallGameAction::East, 1.0, &[2, 0]);
        let changed = agent.table.values().iter().filter(|&&v| v != 0.0).count();
        assert_eq!(changed, 1);
        assert!(agent.table.get(&[1, 0], BallGameAction::East.numeric()) > 0.0);
    }

    #[test]
    fn test_decay_epsilon_converges_to_min() {
        let mut agent = agent(AgentParameter::default());
        let mut last = agent.epsilon();
        for _ in 0..5_000 {
            agent.decay_epsilon();
            assert!(agent.epsilon() <= last);
            assert!(agent.epsilon() >= 0.05);
            last = agent.epsilon();
        }
        assert_eq!(agent.epsilon(), 0.05);
    }

    #[test]
    fn test_greedy_choice_is_first_best() {
        let table = QTable::new(&SHAPE, 5).unwrap();
        let mut agent: QLearningAgent<BallGameAction> = QLearningAgent::greedy(table, &SHAPE, StdRng::seed_from_u64(1)).unwrap();
        // all zero -> first action
        assert_eq!(agent.choose_action(&[1, 1]).unwrap().numeric(), 0);
        agent.table.set(&[1, 1], BallGameAction::South.numeric(), 0.5);
        agent.table.set(&[1, 1], BallGameAction::East.numeric(), 0.5);
        assert_eq!(agent.choose_action(&[1, 1]).unwrap(), BallGameAction::East);
    }

    #[test]
    fn test_full_exploration_covers_all_actions() {
        let mut agent = agent(AgentParameter::default());
        let mut seen = [false; 5];
        for _ in 0..500 {
            seen[agent.choose_action(&[0, 0]).unwrap().numeric() as usize] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[rstest]
    #[case(AgentParameter { alpha: 0.0, ..AgentParameter::default() })]
    #[case(AgentParameter { alpha: 1.5, ..AgentParameter::default() })]
    #[case(AgentParameter { gamma: -0.1, ..AgentParameter::default() })]
    #[case(AgentParameter { epsilon_min: 0.5, epsilon_max: 0.2, ..AgentParameter::default() })]
    #[case(AgentParameter { epsilon_decay: 0.0, ..AgentParameter::default() })]
    fn test_invalid_parameter_is_rejected(#[case] param: AgentParameter) {
        assert!(QLearningAgent::<BallGameAction>::new(&SHAPE, param, StdRng::seed_from_u64(0)).is_err());
    }

    #[test]
    fn test_table_shape_mismatch_is_rejected() {
        let table = QTable::new(&[3, 3, 2], 5).unwrap();
        assert!(QLearningAgent::<BallGameAction>::with_table(table, &SHAPE, AgentParameter::default(), StdRng::seed_from_u64(0)).is_err());
        let table = QTable::new(&SHAPE, 3).unwrap();
        assert!(QLearningAgent::<BallGameAction>::with_table(table, &SHAPE, AgentParameter::default(), StdRng::seed_from_u64(0)).is_err());
    }

    #[test]
    #[should_panic(expected = "out of value table bounds")]
    fn test_out_of_range_state_is_fatal() {
        let mut agent = agent(AgentParameter::greedy());
        let _ = agent.choose_action(&[3, 0]);
    }

    #[test]
    #[should_panic(expected = "out of value table bounds")]
    fn test_out_of_range_state_is_fatal_while_exploring() {
        let mut agent = agent(AgentParameter::default());
        agent.explore_fully();
        let _ = agent.choose_action(&[0, 3]);
    }
}
