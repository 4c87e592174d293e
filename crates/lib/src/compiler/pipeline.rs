//! Per-invocation pipeline state.

use std::fmt;

use tracing::debug;

use super::Stage;

/// Where one orchestrator call is in its pipeline.
///
/// `Created → Transpiling → Transpiled → Building → Built → Running → Completed`.
/// `Transpiled` may also go straight to `Running` (the backend builds as part of
/// running) or to `Completed` (transpile only), `Built` may go to `Completed`
/// (build only), and any non-terminal state may go to `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
  Created,
  Transpiling,
  Transpiled,
  Building,
  Built,
  Running,
  Completed,
  Failed(Stage),
}

impl PipelineState {
  pub fn is_terminal(&self) -> bool {
    matches!(self, Self::Completed | Self::Failed(_))
  }

  pub fn can_advance_to(&self, next: PipelineState) -> bool {
    use PipelineState::*;

    match (self, next) {
      (current, Failed(_)) => !current.is_terminal(),
      (Created, Transpiling)
      | (Transpiling, Transpiled)
      | (Transpiled, Building | Running | Completed)
      | (Building, Built)
      | (Built, Running | Completed)
      | (Running, Completed) => true,
      _ => false,
    }
  }
}

impl fmt::Display for PipelineState {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Created => f.write_str("created"),
      Self::Transpiling => f.write_str("transpiling"),
      Self::Transpiled => f.write_str("transpiled"),
      Self::Building => f.write_str("building"),
      Self::Built => f.write_str("built"),
      Self::Running => f.write_str("running"),
      Self::Completed => f.write_str("completed"),
      Self::Failed(stage) => write!(f, "failed ({stage})"),
    }
  }
}

/// Tracks the state of a single pipeline and refuses illegal transitions.
#[derive(Debug)]
pub struct Pipeline {
  state: PipelineState,
}

impl Default for Pipeline {
  fn default() -> Self {
    Self::new()
  }
}

impl Pipeline {
  pub fn new() -> Self {
    Self {
      state: PipelineState::Created,
    }
  }

  pub fn state(&self) -> PipelineState {
    self.state
  }

  /// Move to `next`. Returns false and keeps the current state if the move is illegal.
  pub fn advance(&mut self, next: PipelineState) -> bool {
    if !self.state.can_advance_to(next) {
      debug!(from = %self.state, to = %next, "illegal pipeline transition");
      return false;
    }
    debug!(from = %self.state, to = %next, "pipeline transition");
    self.state = next;
    true
  }

  /// Advance along a path the orchestrator always takes in order.
  pub(crate) fn enter(&mut self, next: PipelineState) {
    let advanced = self.advance(next);
    debug_assert!(advanced, "illegal pipeline transition to {next}");
  }

  pub fn fail(&mut self, stage: Stage) {
    self.advance(PipelineState::Failed(stage));
  }
}
