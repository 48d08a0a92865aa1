use crate::session::{RenderCommand, RenderSink};
use std::io::Write;

/// Line-oriented renderer for pipes and `--plain`.
///
/// Articles are printed as they arrive, so output order follows arrival order
/// rather than index order; each block is labelled with its index.
pub struct PlainPrinter<W: Write> {
    out: W,
    expected: usize,
}

impl<W: Write> PlainPrinter<W> {
    pub fn new(out: W) -> Self {
        Self { out, expected: 0 }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_command(&mut self, command: RenderCommand) -> std::io::Result<()> {
        match command {
            RenderCommand::ShowLoading => writeln!(self.out, "* Generating..."),
            RenderCommand::SetStatus(text) => writeln!(self.out, "  └ {text}"),
            RenderCommand::CreatePlaceholders(count) => {
                self.expected = count;
                writeln!(self.out, "* Found {count} sources")
            }
            RenderCommand::RenderResult {
                index,
                content,
                source,
            } => {
                writeln!(self.out)?;
                writeln!(self.out, "── Article {} of {} ──", index + 1, self.expected)?;
                writeln!(self.out, "{}", content.trim_end())?;
                writeln!(self.out, "↗ {} <{}>", source.title, source.url)
            }
            RenderCommand::ShowError(text) => writeln!(self.out, "[error] {text}"),
            RenderCommand::ShowWarning(text) => writeln!(self.out, "[warning] {text}"),
            RenderCommand::ClearProgress => writeln!(self.out, "\n* Done"),
            RenderCommand::Reset => writeln!(self.out, "* Cancelled"),
        }?;
        self.out.flush()
    }
}

impl<W: Write> RenderSink for PlainPrinter<W> {
    fn apply(&mut self, command: RenderCommand) {
        if let Err(error) = self.write_command(command) {
            tracing::warn!(%error, "failed to write plain output");
        }
    }
}
