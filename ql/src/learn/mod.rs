pub mod episode_history;
pub mod q_learning_agent;
pub mod q_table;
pub mod self_driving_q_learner;
