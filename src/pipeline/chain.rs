use std::{fmt, str::FromStr};

use crate::foundation::error::{ChainError, ChainResult};

/// One `name[=param]` token of a chain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Operation {
    /// Operation name, looked up in the registry.
    pub name: String,
    /// Text after the first `=`, empty when there is none.
    pub raw_param: String,
}

impl Operation {
    /// Split a token on its first `=`.
    pub fn parse_token(token: &str) -> Option<Self> {
        let (name, raw_param) = token.split_once('=').unwrap_or((token, ""));
        if name.is_empty() {
            return None;
        }
        Some(Self {
            name: name.to_string(),
            raw_param: raw_param.to_string(),
        })
    }
}

/// Ordered operations parsed from `op1=param1,op2,op3=param3`.
///
/// Order is significant and preserved exactly; nothing is reordered or deduplicated.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OperationChain {
    ops: Vec<Operation>,
}

impl OperationChain {
    /// Parse a comma-separated chain. Empty tokens are rejected.
    pub fn parse(chain: &str) -> ChainResult<Self> {
        let ops = chain
            .split(',')
            .enumerate()
            .map(|(index, token)| {
                Operation::parse_token(token).ok_or(ChainError::EmptyOperation { index })
            })
            .collect::<ChainResult<Vec<_>>>()?;
        Ok(Self { ops })
    }

    /// Operations in application order.
    pub fn operations(&self) -> &[Operation] {
        &self.ops
    }

    /// Number of operations.
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// `true` for a chain with no operations (only constructible via `Default`).
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

impl FromStr for OperationChain {
    type Err = ChainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for OperationChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, op) in self.ops.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            f.write_str(&op.name)?;
            if !op.raw_param.is_empty() {
                write!(f, "={}", op.raw_param)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/chain.rs"]
mod tests;
