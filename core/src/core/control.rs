// tithe/src/core/control.rs

//! Flow signals between step handlers and the pipeline runner.

/// Returned by every step handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineControl {
  /// Move on to the next handler or step.
  Continue,
  /// Halt the run. No later handler executes.
  Stop,
}

/// How a run ended when no handler returned an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineResult {
  Completed,
  /// A handler returned `PipelineControl::Stop`.
  Stopped,
}
