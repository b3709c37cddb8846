// tithe/src/core/step.rs

/// A named stage of a pipeline.
///
/// An optional step with no handlers attached is skipped at run time; a
/// non-optional one fails the run with `TitheError::HandlerMissing`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepDef {
  pub name: String,
  pub optional: bool,
}
