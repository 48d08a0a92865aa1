use crate::session::{RenderCommand, RenderSink, MAX_PLACEHOLDERS};
use crate::types::Source;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ViewPhase {
    /// Nothing submitted, or the last submission failed and the form is back.
    #[default]
    Input,
    Loading,
    Results,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Slot {
    Pending,
    Filled { content: String, source: Source },
}

/// Presentation state rebuilt purely from render commands.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultsView {
    phase: ViewPhase,
    status: Option<String>,
    slots: Vec<Slot>,
    error: Option<String>,
    warning: Option<String>,
}

impl ResultsView {
    pub fn phase(&self) -> ViewPhase {
        self.phase
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn warning(&self) -> Option<&str> {
        self.warning.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.phase == ViewPhase::Loading
    }

    pub fn filled_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| matches!(slot, Slot::Filled { .. }))
            .count()
    }
}

impl RenderSink for ResultsView {
    fn apply(&mut self, command: RenderCommand) {
        match command {
            RenderCommand::ShowLoading => {
                *self = ResultsView {
                    phase: ViewPhase::Loading,
                    ..ResultsView::default()
                };
            }
            RenderCommand::SetStatus(text) => self.status = Some(text),
            RenderCommand::CreatePlaceholders(count) => {
                self.slots = vec![Slot::Pending; count.min(MAX_PLACEHOLDERS)];
            }
            RenderCommand::RenderResult {
                index,
                content,
                source,
            } => {
                if let Some(slot) = self.slots.get_mut(index) {
                    *slot = Slot::Filled { content, source };
                }
            }
            RenderCommand::ShowError(text) => {
                self.phase = ViewPhase::Input;
                self.status = None;
                self.error = Some(text);
            }
            RenderCommand::ShowWarning(text) => self.warning = Some(text),
            RenderCommand::ClearProgress => {
                self.phase = ViewPhase::Results;
                self.status = None;
            }
            RenderCommand::Reset => *self = ResultsView::default(),
        }
    }
}
