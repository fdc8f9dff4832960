use std::collections::VecDeque;

/// Bounded FIFO buffer; the oldest element is dropped when full
pub struct RingBuffer<T> {
    max_buffer_len: usize,
    pub buffer: VecDeque<T>,
}

impl<T> RingBuffer<T> {
    pub fn new(max_buffer_len: usize) -> Self {
        assert!(max_buffer_len > 0);
        Self {
            max_buffer_len,
            buffer: VecDeque::with_capacity(max_buffer_len),
        }
    }

    pub fn len(&self) -> usize { self.buffer.len() }

    pub fn is_empty(&self) -> bool { self.buffer.is_empty() }

    pub fn add(
        &mut self,
        element: T,
    ) {
        if self.buffer.len() == self.max_buffer_len {
            self.buffer.pop_front();
        }
        self.buffer.push_back(element);
    }
}

/// Recent episode rewards and actions, used for the running statistics of a learner
pub struct EpisodeHistory<A> {
    episode_rewards: RingBuffer<f32>,
    actions: RingBuffer<A>,
}

impl<A> EpisodeHistory<A> {
    pub fn new(
        episode_reward_buffer_len: usize,
        action_buffer_len: usize,
    ) -> Self {
        Self {
            episode_rewards: RingBuffer::new(episode_reward_buffer_len),
            actions: RingBuffer::new(action_buffer_len),
        }
    }

    pub fn add_action(
        &mut self,
        action: A,
    ) {
        self.actions.add(action)
    }

    pub fn add_episode_reward(
        &mut self,
        episode_reward: f32,
    ) {
        self.episode_rewards.add(episode_reward)
    }

    pub fn actions(&self) -> &RingBuffer<A> { &self.actions }

    pub fn episode_rewards(&self) -> Vec<f32> { self.episode_rewards.buffer.iter().copied().collect() }

    pub fn avg_episode_reward(&self) -> f32 {
        let c = &self.episode_rewards.buffer;
        if c.is_empty() {
            return 0.0;
        }
        c.iter().sum::<f32>() / c.len() as f32
    }

    pub fn min_episode_reward(&self) -> f32 {
        let c = &self.episode_rewards.buffer;
        if c.is_empty() {
            return 0.0;
        }
        c.iter().copied().fold(f32::INFINITY, f32::min)
    }
}
