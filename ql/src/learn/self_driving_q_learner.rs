use anyhow::Result;
use itertools::Itertools;
use num_format::ToFormattedString;
use rand::rngs::StdRng;
use rustc_hash::FxHashMap;

use crate::learn::episode_history::EpisodeHistory;
use crate::learn::q_learning_agent::{AgentParameter, QLearningAgent};
use crate::learn::q_table::QTable;
use crate::prelude::{Action, DiscreteState, Environment, QlError};
use crate::util::format;

#[derive(Clone, Debug)]
pub struct Parameter {
    pub agent: AgentParameter,
    pub max_steps_per_episode: usize,
    /// Number of recent episodes the running reward statistics are calculated from
    pub episode_reward_history_len: usize,
    /// Number of recent actions the action distribution (stats log) is calculated from
    pub action_history_len: usize,
    /// Log learning statistics every n episodes
    pub stats_after_episodes: usize,
    /// Use the bare reward as target for the final transition of an episode instead of bootstrapping
    /// from the (meaningless) successor state
    pub zero_terminal_value: bool,
}

impl Parameter {
    pub fn validate(&self) -> Result<()> {
        self.agent.validate()?;
        if self.max_steps_per_episode == 0 || self.episode_reward_history_len == 0 || self.action_history_len == 0 || self.stats_after_episodes == 0 {
            return Err(QlError::from(
                "max_steps_per_episode, episode_reward_history_len, action_history_len and stats_after_episodes must be > 0",
            ))?;
        }
        Ok(())
    }
}

impl Default for Parameter {
    fn default() -> Self {
        Self {
            agent: AgentParameter::default(),
            max_steps_per_episode: 1_000,
            episode_reward_history_len: 100,
            action_history_len: 10_000,
            stats_after_episodes: 100,
            zero_terminal_value: false,
        }
    }
}

/// Totals of one finished episode
#[derive(Clone, Debug, PartialEq)]
pub struct EpisodeStats {
    /// 1-based episode number
    pub episode: usize,
    pub steps: usize,
    pub total_reward: f32,
    pub score: u32,
    pub lives: u32,
    /// Exploration rate after the episode (after decay, when learning)
    pub epsilon: f32,
    /// false: the episode was cut off by `max_steps_per_episode`
    pub terminated: bool,
}

/// A self-driving tabular Q-learner.
///
/// Owns the environment and the agent, and drives the environment step by step:
/// `choose_action → step → update` until the episode ends, then decays epsilon.
pub struct SelfDrivingQLearner<E: Environment> {
    environment: E,
    agent: QLearningAgent<E::A>,
    param: Parameter,
    history: EpisodeHistory<E::A>,
    step_count: usize,
    episode_count: usize,
}

impl<E: Environment> SelfDrivingQLearner<E> {
    /// Learner starting from a zero-initialized value table
    pub fn new(
        environment: E,
        param: Parameter,
        rng: StdRng,
    ) -> Result<Self> {
        let table = QTable::new(environment.state_shape(), E::A::ACTION_SPACE)?;
        Self::with_table(environment, param, table, rng)
    }

    /// Learner continuing with a previously learned table
    pub fn with_table(
        environment: E,
        param: Parameter,
        table: QTable,
        rng: StdRng,
    ) -> Result<Self> {
        param.validate()?;
        let agent = QLearningAgent::with_table(table, environment.state_shape(), param.agent.clone(), rng)?;
        let history = EpisodeHistory::new(param.episode_reward_history_len, param.action_history_len);
        Ok(Self {
            environment,
            agent,
            param,
            history,
            step_count: 0,
            episode_count: 0,
        })
    }

    pub fn environment(&self) -> &E { &self.environment }

    pub fn agent(&self) -> &QLearningAgent<E::A> { &self.agent }

    pub fn agent_mut(&mut self) -> &mut QLearningAgent<E::A> { &mut self.agent }

    pub fn step_count(&self) -> usize { self.step_count }

    pub fn episode_count(&self) -> usize { self.episode_count }

    /// Mean reward over the recent episodes
    pub fn running_reward(&self) -> f32 { self.history.avg_episode_reward() }

    pub fn into_table(self) -> QTable { self.agent.into_table() }

    pub fn learn_episodes(
        &mut self,
        num_episodes: usize,
    ) -> Result<Vec<EpisodeStats>> {
        (0..num_episodes).map(|_| self.learn_episode()).collect()
    }

    pub fn learn_episode(&mut self) -> Result<EpisodeStats> {
        let mut state = self.environment.reset();
        log::trace!("started learning episode {}", self.episode_count + 1);

        let mut episode_reward: f32 = 0.0;
        let mut steps = 0;
        let mut terminated = false;

        while steps < self.param.max_steps_per_episode {
            steps += 1;
            self.step_count += 1;

            let action = self.agent.choose_action(state.indices())?;
            let (state_next, reward, done) = self.environment.step(action);
            log::trace!("{:?} with action {} resulted in reward: {:.2}, done: {}", state, action, reward, done);

            if done && self.param.zero_terminal_value {
                self.agent.update_terminal(state.indices(), action, reward);
            } else {
                self.agent.update(state.indices(), action, reward, state_next.indices());
            }

            episode_reward += reward;
            self.history.add_action(action);
            state = state_next;

            if done {
                terminated = true;
                break;
            }
        }

        self.agent.decay_epsilon();
        self.history.add_episode_reward(episode_reward);
        self.episode_count += 1;

        if self.episode_count % self.param.stats_after_episodes == 0 {
            self.learning_update_log();
        }

        Ok(self.episode_stats(steps, episode_reward, terminated))
    }

    /// Plays one episode with the agent's current policy, without learning
    pub fn play_episode(&mut self) -> Result<EpisodeStats> {
        self.play_episode_observed(|_| Ok(true))
    }

    /// Like [Self::play_episode], calling `observer` with the environment after each step.
    /// The observer stops the episode early by returning `false`.
    pub fn play_episode_observed<F>(
        &mut self,
        mut observer: F,
    ) -> Result<EpisodeStats>
    where
        F: FnMut(&E) -> Result<bool>,
    {
        let mut state = self.environment.reset();
        let mut episode_reward: f32 = 0.0;
        let mut steps = 0;
        let mut terminated = false;

        while steps < self.param.max_steps_per_episode {
            steps += 1;
            let action = self.agent.choose_action(state.indices())?;
            let (state_next, reward, done) = self.environment.step(action);
            episode_reward += reward;
            state = state_next;

            let proceed = observer(&self.environment)?;
            if done {
                terminated = true;
                break;
            }
            if !proceed {
                break;
            }
        }

        Ok(self.episode_stats(steps, episode_reward, terminated))
    }

    fn episode_stats(
        &self,
        steps: usize,
        total_reward: f32,
        terminated: bool,
    ) -> EpisodeStats {
        EpisodeStats {
            episode: self.episode_count,
            steps,
            total_reward,
            score: self.environment.score(),
            lives: self.environment.lives(),
            epsilon: self.agent.epsilon(),
            terminated,
        }
    }

    fn learning_update_log(&self) {
        let number_format = format::number_format();

        let mut action_counts = FxHashMap::<E::A, usize>::default();
        for &a in &self.history.actions().buffer {
            action_counts.entry(a).and_modify(|e| *e += 1).or_insert(1);
        }

        let total_actions = self.history.actions().len();
        let action_distribution_line = action_counts
            .iter()
            .sorted_by_key(|(action, _)| action.numeric())
            .map(|(&action, &count)| {
                let ratio = 100.0 * count as f32 / total_actions as f32;
                format!("{} {:.1}%", action, ratio)
            })
            .join(", ");

        log::info!(
            "episode: {}, steps: {}, α={:.2}, 𝛾={:.2}, 𝜀={:.3}, rewards (last {}): {{mean: {:.1}, low: {:.1}}}, action_distribution (of last {}): {}",
            self.episode_count.to_formatted_string(&number_format),
            self.step_count.to_formatted_string(&number_format),
            self.param.agent.alpha,
            self.param.agent.gamma,
            self.agent.epsilon(),
            self.history.episode_rewards().len(),
            self.history.avg_episode_reward(),
            self.history.min_episode_reward(),
            total_actions.to_formatted_string(&number_format),
            action_distribution_line
        );
    }
}
