use ratatui::layout::{Constraint, Direction, Layout, Rect};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResultsLayout {
    pub header: Rect,
    pub banner: Rect,
    pub body: Rect,
    pub footer: Rect,
}

/// Header and footer take one row each; the banner shrinks to zero rows when
/// there is no error or warning to show.
pub fn split_results_layout(area: Rect, banner_rows: u16) -> ResultsLayout {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(banner_rows),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(area);

    ResultsLayout {
        header: chunks[0],
        banner: chunks[1],
        body: chunks[2],
        footer: chunks[3],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_without_banner_gives_body_the_rest() {
        let area = Rect::new(0, 0, 80, 20);
        let panes = split_results_layout(area, 0);

        assert_eq!(panes.header.height, 1);
        assert_eq!(panes.banner.height, 0);
        assert_eq!(panes.body.height, 18);
        assert_eq!(panes.footer.height, 1);
        assert_eq!(panes.body.y, 1);
        assert_eq!(panes.footer.y, 19);
    }

    #[test]
    fn layout_reserves_banner_rows() {
        let area = Rect::new(0, 0, 80, 12);
        let panes = split_results_layout(area, 2);

        assert_eq!(panes.banner.height, 2);
        assert_eq!(panes.banner.y, 1);
        assert_eq!(panes.body.y, 3);
        assert_eq!(panes.body.height, 8);
    }
}
