// tithe/src/pipeline/definition.rs

//! The `Pipeline<TData, Err>` struct and the methods that declare its steps
//! and attach handlers to them.

use crate::core::context_data::ContextData;
use crate::core::control::PipelineControl;
use crate::core::step::StepDef;
use crate::error::TitheError;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

/// An asynchronous step handler.
///
/// Receives a clone of the run's `ContextData<TData>` and resolves to the
/// control signal for the runner. Lock guards taken inside a handler must be
/// dropped before the handler awaits anything.
pub type Handler<TData, Err> = Box<
  dyn Fn(ContextData<TData>) -> Pin<Box<dyn Future<Output = Result<PipelineControl, Err>> + Send>>
    + Send
    + Sync,
>;

/// Ordered, named steps executed against one shared context per run.
///
/// `Err` must be buildable from `TitheError` so that runner-level failures
/// (such as a required step with no handler) arrive in the pipeline's own
/// error type.
pub struct Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<TitheError> + Send + Sync + 'static,
{
  pub(crate) steps: Vec<StepDef>,
  pub(crate) handlers: HashMap<String, Vec<Handler<TData, Err>>>,
}

impl<TData, Err> Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<TitheError> + Send + Sync + 'static,
{
  /// Declares the steps, in execution order, as `(name, optional)` pairs.
  pub fn new(step_defs: &[(&str, bool)]) -> Self {
    let mut steps: Vec<StepDef> = Vec::with_capacity(step_defs.len());
    for (name, optional) in step_defs {
      if steps.iter().any(|s| s.name == *name) {
        panic!("Pipeline setup error: step '{}' declared twice.", name);
      }
      steps.push(StepDef {
        name: (*name).to_string(),
        optional: *optional,
      });
    }

    Self {
      steps,
      handlers: HashMap::new(),
    }
  }

  pub fn step_names(&self) -> Vec<&str> {
    self.steps.iter().map(|s| s.name.as_str()).collect()
  }

  /// Attaches a handler to a declared step. Handlers of one step run in
  /// registration order.
  ///
  /// Panics if the step was never declared; that is a wiring mistake made
  /// while building the pipeline, not something a request can trigger.
  pub fn on_step<F, UserProvidedErr>(
    &mut self,
    step_name: &str,
    handler_fn: impl Fn(ContextData<TData>) -> F + Send + Sync + 'static,
  ) where
    F: Future<Output = Result<PipelineControl, UserProvidedErr>> + Send + 'static,
    UserProvidedErr: Into<Err> + Send + Sync + 'static,
  {
    self.ensure_step_exists(step_name);
    let handler: Handler<TData, Err> = Box::new(move |ctx_data| {
      let user_fut = handler_fn(ctx_data);
      Box::pin(async move { user_fut.await.map_err(Into::into) })
    });
    self.handlers.entry(step_name.to_string()).or_default().push(handler);
  }

  fn ensure_step_exists(&self, step_name: &str) {
    if !self.steps.iter().any(|s| s.name == step_name) {
      panic!("Pipeline setup error: step '{}' not found in pipeline definition.", step_name);
    }
  }
}
