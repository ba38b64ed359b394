//! Workflow Engine
//!
//! A workflow is an ordered list of agent calls sharing a JSON context.
//!
//! ```text
//! create(definition, context) ── validate bindings ──► pending
//! run(id):  for each step
//!             when? ──falsy──► skipped
//!             resolve inputs ─► agent ─ok─► context.lastOutput / output_key
//!                                    └─fail─► run failed, later steps pending
//! resume(id): failed run continues from the failed step
//! ```

mod definition;
mod engine;
mod state;
mod templates;

pub use definition::{lookup, InputBinding, StepDefinition, WorkflowDefinition};
pub use engine::{EngineConfig, WorkflowEngine, WorkflowError};
pub use state::{RunStatus, StepState, StepStatus, WorkflowId, WorkflowState, LAST_OUTPUT_KEY};
pub use templates::{WorkflowTemplates, DEFAULT_TEMPLATES_DIR};
