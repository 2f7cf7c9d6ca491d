mod q_learning;
mod td_lambda;
mod value_learner;

pub use q_learning::{QLearningAgent, QLearningConfig};
pub use td_lambda::{EligibilityTraces, TdLambdaAgent, TdLambdaConfig};
pub use value_learner::{discounted_target, ValueAgent, ValueConfig};
