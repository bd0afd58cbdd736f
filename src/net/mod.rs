//! 通信组模块
//!
//! 此模块定义集合通信所依赖的点对点通信组接口，以及用于测试和本地运行的进程内全连接实现。

// 子模块声明
mod error;
mod group;
mod local;
mod stats;

// 重新导出公共接口
pub use error::{GroupError, MeshError};
pub use group::{Connection, Group, Message};
pub use local::{LocalGroup, LocalMesh, run_workers};
pub use stats::GroupStats;
