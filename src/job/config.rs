use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::cc::CollectiveOp;

use super::error::JobError;

pub const SCHEMA_VERSION: u32 = 1;

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// One collective run over an in-process group, as read from `job.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobConfig {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub num_hosts: usize,
    pub collective: String,
    #[serde(default)]
    pub op: SumOpKind,
    /// One value per host, indexed by rank.
    pub values: JobValues,
    /// Root of a reduce or origin of a broadcast; defaults to 0.
    #[serde(default)]
    pub root: Option<usize>,
    /// Only read by `prefix_sum`; defaults to true.
    #[serde(default)]
    pub inclusive: Option<bool>,
    /// Starting element of a prefix sum: every host's result is offset by
    /// it, and host 0 of an exclusive scan gets exactly this value. Must be
    /// of the same kind as `values`.
    #[serde(default)]
    pub initial: Option<JobValue>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum JobValue {
    Int(i64),
    Str(String),
}

impl JobValue {
    /// An integer if `raw` parses as one, a string otherwise.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        match raw.parse::<i64>() {
            Ok(v) => Self::Int(v),
            Err(_) => Self::Str(raw.to_owned()),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Int(_) => "integer",
            Self::Str(_) => "string",
        }
    }
}

impl fmt::Display for JobValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Str(v) => write!(f, "{v:?}"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SumOpKind {
    #[default]
    Sum,
    Product,
    Min,
    Max,
    Concat,
}

impl SumOpKind {
    pub fn parse(raw: &str) -> Result<Self, String> {
        match raw.trim().to_lowercase().as_str() {
            "sum" | "add" | "+" => Ok(Self::Sum),
            "product" | "mul" | "*" => Ok(Self::Product),
            "min" => Ok(Self::Min),
            "max" => Ok(Self::Max),
            "concat" | "cat" => Ok(Self::Concat),
            _ => Err(format!("unknown sum op: {raw}")),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Sum => "sum",
            Self::Product => "product",
            Self::Min => "min",
            Self::Max => "max",
            Self::Concat => "concat",
        }
    }

    /// Wrapping arithmetic keeps the operators associative on overflow.
    pub fn int_op(self) -> Option<fn(&i64, &i64) -> i64> {
        let op: fn(&i64, &i64) -> i64 = match self {
            Self::Sum => |a, b| a.wrapping_add(*b),
            Self::Product => |a, b| a.wrapping_mul(*b),
            Self::Min => |a, b| *a.min(b),
            Self::Max => |a, b| *a.max(b),
            Self::Concat => return None,
        };
        Some(op)
    }

    pub fn int_identity(self) -> Option<i64> {
        match self {
            Self::Sum => Some(0),
            Self::Product => Some(1),
            Self::Min => Some(i64::MAX),
            Self::Max => Some(i64::MIN),
            Self::Concat => None,
        }
    }

    pub fn is_string_op(self) -> bool {
        self == Self::Concat
    }
}

impl fmt::Display for SumOpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum JobValues {
    Ints(Vec<i64>),
    Strings(Vec<String>),
}

impl JobValues {
    /// Integers if every entry parses as one, strings otherwise.
    pub fn parse_list(raw: &str) -> Self {
        let parts: Vec<&str> = raw.split(',').map(str::trim).collect();
        let ints: Result<Vec<i64>, _> = parts.iter().map(|p| p.parse::<i64>()).collect();
        match ints {
            Ok(ints) => Self::Ints(ints),
            Err(_) => Self::Strings(parts.into_iter().map(str::to_owned).collect()),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Ints(v) => v.len(),
            Self::Strings(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Ints(_) => "integer",
            Self::Strings(_) => "string",
        }
    }
}

impl JobConfig {
    pub fn from_json(raw: &str) -> Result<Self, JobError> {
        serde_json::from_str(raw).map_err(JobError::Parse)
    }

    pub fn from_path(path: &Path) -> Result<Self, JobError> {
        let raw = fs::read_to_string(path).map_err(|source| JobError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }

    pub fn root(&self) -> usize {
        self.root.unwrap_or(0)
    }

    /// Check the job before spawning any host.
    pub fn validate(&self) -> Result<CollectiveOp, JobError> {
        if self.schema_version != SCHEMA_VERSION {
            return Err(JobError::SchemaVersion {
                got: self.schema_version,
                expected: SCHEMA_VERSION,
            });
        }
        if self.num_hosts == 0 {
            return Err(JobError::EmptyGroup);
        }
        let collective = CollectiveOp::parse(&self.collective).map_err(JobError::UnknownCollective)?;
        if self.values.len() != self.num_hosts {
            return Err(JobError::ValueCount {
                expected: self.num_hosts,
                got: self.values.len(),
            });
        }
        let compatible = match self.values {
            JobValues::Ints(_) => !self.op.is_string_op(),
            JobValues::Strings(_) => self.op.is_string_op(),
        };
        if !compatible {
            return Err(JobError::IncompatibleOp {
                op: self.op,
                kind: self.values.kind(),
            });
        }
        if let Some(initial) = &self.initial {
            if !matches!(collective, CollectiveOp::PrefixSum | CollectiveOp::ExPrefixSum) {
                return Err(JobError::InitialNotSupported { collective });
            }
            if initial.kind() != self.values.kind() {
                return Err(JobError::InitialKind {
                    expected: self.values.kind(),
                    got: initial.kind(),
                });
            }
        }
        Ok(collective)
    }
}
