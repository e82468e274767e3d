mod backend;
mod gateway;

pub use backend::*;
pub use gateway::*;
