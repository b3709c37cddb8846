// tithe/src/pipeline/execution.rs

//! `Pipeline::run()`: walks the declared steps against one context.

use crate::core::context_data::ContextData;
use crate::core::control::{PipelineControl, PipelineResult};
use crate::error::TitheError;
use crate::pipeline::definition::Pipeline;
use tracing::{event, instrument, span, Instrument, Level};

impl<TData, Err> Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<TitheError> + Send + Sync + 'static,
{
  /// Executes every step in order against `ctx_data`.
  ///
  /// Stops at the first handler that returns `PipelineControl::Stop`
  /// (`Ok(PipelineResult::Stopped)`) or an error (returned as is). Each
  /// handler is awaited to completion before the next one starts.
  #[instrument(
    name = "Pipeline::run",
    skip_all,
    fields(
      pipeline_context_data_type = %std::any::type_name::<TData>(),
      num_steps = self.steps.len(),
    ),
    err(Display)
  )]
  pub async fn run(&self, ctx_data: ContextData<TData>) -> Result<PipelineResult, Err> {
    event!(Level::DEBUG, "Pipeline execution starting.");

    for (step_idx, step_def) in self.steps.iter().enumerate() {
      let step_name = step_def.name.as_str();
      let step_span = span!(
        Level::INFO,
        "pipeline_step_execution",
        step_name = step_name,
        step_index = step_idx,
        optional = step_def.optional
      );

      let handlers = match self.handlers.get(step_name) {
        Some(handlers) if !handlers.is_empty() => handlers,
        _ if step_def.optional => {
          event!(parent: &step_span, Level::DEBUG, "Optional step has no handlers, skipping.");
          continue;
        }
        _ => {
          event!(parent: &step_span, Level::ERROR, "Non-optional step has no handlers.");
          return Err(Err::from(TitheError::HandlerMissing {
            step_name: step_def.name.clone(),
          }));
        }
      };

      for (handler_idx, handler_fn) in handlers.iter().enumerate() {
        event!(parent: &step_span, Level::TRACE, handler_index = handler_idx, "Executing handler.");
        match handler_fn(ctx_data.clone()).instrument(step_span.clone()).await {
          Ok(PipelineControl::Continue) => {}
          Ok(PipelineControl::Stop) => {
            event!(parent: &step_span, Level::INFO, "Pipeline stopped by a handler.");
            return Ok(PipelineResult::Stopped);
          }
          Err(e) => {
            event!(parent: &step_span, Level::ERROR, error = %e, "Step handler failed.");
            return Err(e);
          }
        }
      }
      event!(parent: &step_span, Level::DEBUG, "Step processing finished successfully.");
    }

    event!(Level::DEBUG, "Pipeline execution completed successfully.");
    Ok(PipelineResult::Completed)
  }
}
