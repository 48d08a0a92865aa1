use crate::ui::layout::split_results_layout;
use crate::ui::view::{ResultsView, Slot, ViewPhase};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Paragraph, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthChar;

pub fn render_view(frame: &mut Frame<'_>, view: &ResultsView, topic: &str, scroll: usize) {
    let layout = split_results_layout(frame.area(), banner_rows(view));

    render_line(
        frame,
        layout.header,
        &header_text(view, topic),
        Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
    );
    render_banner(frame, layout.banner, view);

    if layout.body.height > 0 && layout.body.width > 0 {
        frame.render_widget(
            Paragraph::new(Text::from(article_lines(view)))
                .wrap(Wrap { trim: false })
                .scroll((scroll.min(u16::MAX as usize) as u16, 0)),
            layout.body,
        );
    }

    render_line(
        frame,
        layout.footer,
        footer_hint(view),
        Style::default().fg(Color::DarkGray),
    );
}

pub fn banner_rows(view: &ResultsView) -> u16 {
    u16::from(view.error().is_some()) + u16::from(view.warning().is_some())
}

pub fn header_text(view: &ResultsView, topic: &str) -> String {
    match view.phase() {
        ViewPhase::Loading => {
            let status = view.status().unwrap_or("Working...");
            if view.slots().is_empty() {
                format!("meish · {topic} · {status}")
            } else {
                format!(
                    "meish · {topic} · {status} ({}/{})",
                    view.filled_count(),
                    view.slots().len()
                )
            }
        }
        ViewPhase::Results => format!(
            "meish · {topic} · {} articles ready",
            view.filled_count()
        ),
        ViewPhase::Input => format!("meish · {topic}"),
    }
}

pub fn footer_hint(view: &ResultsView) -> &'static str {
    if view.is_loading() {
        "esc cancel · ↑/↓ scroll · q quit"
    } else {
        "r resubmit · ↑/↓ scroll · q quit"
    }
}

pub fn article_lines(view: &ResultsView) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    if view.slots().is_empty() {
        let hint = match view.phase() {
            ViewPhase::Loading => "Waiting for sources...",
            ViewPhase::Results => "The server finished without articles.",
            ViewPhase::Input if view.error().is_some() => "Press r to try again.",
            ViewPhase::Input => "Press r to submit.",
        };
        lines.push(Line::styled(hint, Style::default().fg(Color::DarkGray)));
        return lines;
    }

    for (index, slot) in view.slots().iter().enumerate() {
        if index > 0 {
            lines.push(Line::from(""));
        }
        lines.push(Line::styled(
            format!("Article {}", index + 1),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ));

        match slot {
            Slot::Pending => lines.push(Line::styled(
                "  writing...",
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::DIM),
            )),
            Slot::Filled { content, source } => {
                for line in content.trim_end().lines() {
                    lines.push(Line::from(line.to_string()));
                }
                lines.push(Line::from(vec![
                    Span::styled("↗ ", Style::default().fg(Color::Cyan)),
                    Span::styled(
                        source.title.clone(),
                        Style::default().fg(Color::Cyan).add_modifier(Modifier::UNDERLINED),
                    ),
                    Span::styled(
                        format!("  {}", source.url),
                        Style::default().fg(Color::DarkGray),
                    ),
                ]));
            }
        }
    }
    lines
}

fn render_banner(frame: &mut Frame<'_>, area: Rect, view: &ResultsView) {
    if area.height == 0 || area.width == 0 {
        return;
    }

    let width = area.width as usize;
    let mut lines = Vec::new();
    if let Some(error) = view.error() {
        lines.push(Line::styled(
            truncate_line(&format!("✗ {error}"), width),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ));
    }
    if let Some(warning) = view.warning() {
        lines.push(Line::styled(
            truncate_line(&format!("⚠ {warning}"), width),
            Style::default().fg(Color::Yellow),
        ));
    }
    frame.render_widget(Paragraph::new(Text::from(lines)), area);
}

fn render_line(frame: &mut Frame<'_>, area: Rect, text: &str, style: Style) {
    if area.height == 0 || area.width == 0 {
        return;
    }

    frame.render_widget(
        Paragraph::new(truncate_line(text, area.width as usize)).style(style),
        area,
    );
}

fn truncate_line(input: &str, width: usize) -> String {
    let width = width.max(1);
    let mut out = String::new();
    let mut used = 0usize;

    for ch in input.chars() {
        let ch_width = ch.width().unwrap_or(0);
        if used + ch_width > width {
            if width >= 4 {
                while used + 3 > width {
                    match out.pop() {
                        Some(removed) => used -= removed.width().unwrap_or(0),
                        None => break,
                    }
                }
                out.push_str("...");
            }
            return out;
        }
        out.push(ch);
        used += ch_width;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{RenderCommand, RenderSink};
    use crate::types::Source;
    use ratatui::{backend::TestBackend, Terminal};

    fn loading_view_with_one_article() -> ResultsView {
        let mut view = ResultsView::default();
        view.apply(RenderCommand::ShowLoading);
        view.apply(RenderCommand::SetStatus("Crafting your articles...".to_string()));
        view.apply(RenderCommand::CreatePlaceholders(2));
        view.apply(RenderCommand::RenderResult {
            index: 1,
            content: "Markets rallied.\nAnalysts cheered.".to_string(),
            source: Source {
                url: "https://news.example/markets".to_string(),
                title: "Markets".to_string(),
            },
        });
        view
    }

    #[test]
    fn test_header_shows_status_and_progress_while_loading() {
        let view = loading_view_with_one_article();
        assert_eq!(
            header_text(&view, "finance"),
            "meish · finance · Crafting your articles... (1/2)"
        );
        assert!(footer_hint(&view).starts_with("esc cancel"));
    }

    #[test]
    fn test_article_lines_mark_pending_slots() {
        let view = loading_view_with_one_article();
        let rendered: Vec<String> = article_lines(&view)
            .iter()
            .map(|line| line.to_string())
            .collect();

        assert_eq!(rendered[0], "Article 1");
        assert_eq!(rendered[1], "  writing...");
        assert!(rendered.contains(&"Markets rallied.".to_string()));
        assert_eq!(
            rendered.last().map(String::as_str),
            Some("↗ Markets  https://news.example/markets")
        );
    }

    #[test]
    fn test_truncate_line_respects_display_width() {
        assert_eq!(truncate_line("hello world", 8), "hello...");
        assert_eq!(truncate_line("short", 10), "short");
        assert_eq!(truncate_line("記事記事記事", 7), "記事...");
    }

    #[test]
    fn test_render_view_draws_into_buffer() {
        let view = loading_view_with_one_article();
        let mut terminal = Terminal::new(TestBackend::new(60, 12)).unwrap();
        terminal
            .draw(|frame| render_view(frame, &view, "finance", 0))
            .unwrap();

        let buffer = terminal.backend().buffer();
        let text: String = buffer
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(text.contains("Article 1"));
        assert!(text.contains("writing..."));
        assert!(text.contains("esc cancel"));
    }
}
