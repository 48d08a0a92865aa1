use crate::types::Source;
use tokio::sync::mpsc;

/// Presentation commands issued by the session controller, in event order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderCommand {
    ShowLoading,
    SetStatus(String),
    CreatePlaceholders(usize),
    RenderResult {
        index: usize,
        content: String,
        source: Source,
    },
    ShowError(String),
    ShowWarning(String),
    ClearProgress,
    Reset,
}

pub trait RenderSink {
    fn apply(&mut self, command: RenderCommand);
}

impl RenderSink for Vec<RenderCommand> {
    fn apply(&mut self, command: RenderCommand) {
        self.push(command);
    }
}

impl RenderSink for mpsc::UnboundedSender<RenderCommand> {
    fn apply(&mut self, command: RenderCommand) {
        // A closed receiver means the frontend is gone; nothing left to draw.
        let _ = self.send(command);
    }
}

impl<S: RenderSink + ?Sized> RenderSink for &mut S {
    fn apply(&mut self, command: RenderCommand) {
        (**self).apply(command);
    }
}
