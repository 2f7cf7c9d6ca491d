mod agent;
pub mod algorithms;
pub mod networks;
pub mod search;
pub mod state_encoding;
pub mod table;

pub use agent::{EvalState, Policy, Trainable};
pub use algorithms::{
    QLearningAgent, QLearningConfig, TdLambdaAgent, TdLambdaConfig, ValueAgent, ValueConfig,
};
pub use networks::{ValueNetwork, ValueNetworkConfig};
pub use search::{tree_info, SearchAgent, SearchConfig, SearchKind, TreeInfo};
pub use table::ValueTable;
