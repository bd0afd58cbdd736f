//! 作业配置与本地运行
//!
//! 从 job.json（或命令行参数）描述一次集合通信调用，在进程内通信组上运行并汇总每个主机的结果与统计。

mod config;
mod error;
mod runner;

pub use config::{JobConfig, JobValue, JobValues, SCHEMA_VERSION, SumOpKind};
pub use error::JobError;
pub use runner::{HostReport, JobReport, run_job};
