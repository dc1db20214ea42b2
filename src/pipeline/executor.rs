use image::RgbaImage;

use crate::{
    foundation::error::{ChainError, ChainResult},
    ops::registry::{Registry, Transform},
    pipeline::chain::OperationChain,
};

/// Policy for operation names that are not in the registry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum UnknownOps {
    /// Fail the chain with [`ChainError::UnknownOperation`].
    #[default]
    Reject,
    /// Leave the image unchanged for that step and log a warning.
    Skip,
}

/// A chain step whose parameter has been parsed.
#[derive(Clone, Debug, PartialEq)]
pub struct CompiledStep {
    /// Operation name, used to attribute failures.
    pub name: String,
    /// Typed transform.
    pub transform: Transform,
}

/// A validated chain: every step is known and well-formed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CompiledChain {
    /// Steps in application order.
    pub steps: Vec<CompiledStep>,
    /// Unknown names dropped under [`UnknownOps::Skip`].
    pub skipped: Vec<String>,
}

/// Applies operation chains against a registry.
#[derive(Clone, Copy, Debug)]
pub struct Pipeline {
    registry: &'static Registry,
    unknown: UnknownOps,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(Registry::builtin(), UnknownOps::default())
    }
}

impl Pipeline {
    /// Build a pipeline over `registry`.
    pub fn new(registry: &'static Registry, unknown: UnknownOps) -> Self {
        Self { registry, unknown }
    }

    /// Unknown-operation policy in effect.
    pub fn unknown_ops(&self) -> UnknownOps {
        self.unknown
    }

    /// Resolve every operation and parse every parameter, stopping at the first failure.
    pub fn compile(&self, chain: &OperationChain) -> ChainResult<CompiledChain> {
        let mut out = CompiledChain::default();
        for op in chain.operations() {
            let Some(spec) = self.registry.get(&op.name) else {
                match self.unknown {
                    UnknownOps::Reject => return Err(ChainError::unknown_operation(&op.name)),
                    UnknownOps::Skip => {
                        tracing::warn!(op = %op.name, "skipping unknown operation");
                        out.skipped.push(op.name.clone());
                        continue;
                    }
                }
            };
            let transform = spec
                .build(&op.raw_param)
                .map_err(|e| ChainError::param(&op.name, e))?;
            out.steps.push(CompiledStep {
                name: op.name.clone(),
                transform,
            });
        }
        Ok(out)
    }

    /// Run compiled steps strictly in order; step `i`'s output is step `i + 1`'s only input.
    pub fn run(&self, compiled: &CompiledChain, img: RgbaImage) -> ChainResult<RgbaImage> {
        compiled.steps.iter().try_fold(img, |img, step| {
            step.transform
                .apply(&img)
                .map_err(|msg| ChainError::transform(&step.name, msg))
        })
    }

    /// Parse, validate and apply `chain` to `img`.
    #[tracing::instrument(skip(self, img), fields(width = img.width(), height = img.height()))]
    pub fn apply(&self, img: RgbaImage, chain: &str) -> ChainResult<RgbaImage> {
        let parsed = OperationChain::parse(chain)?;
        let compiled = self.compile(&parsed)?;
        self.run(&compiled, img)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/executor.rs"]
mod tests;
