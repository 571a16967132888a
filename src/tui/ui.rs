use ratatui::layout::{Constraint, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::session::{Row, RowKind, View};

/// Draw the status bar, the visible window of the tree and the key help
pub fn draw(frame: &mut Frame, view: &View<'_>) {
    use Constraint::{Length, Min};
    let layout = Layout::vertical([Length(1), Min(0), Length(1)]);
    let [status_area, tree_area, help_area] = layout.areas(frame.area());

    let status = Span::styled(
        view.status.clone(),
        Style::default().add_modifier(Modifier::BOLD),
    );
    frame.render_widget(status, status_area);

    let lines: Vec<Line> = view.rows.iter().map(row_line).collect();
    frame.render_widget(Paragraph::new(lines), tree_area);

    let help = Paragraph::new(view.help_line()).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, help_area);
}

fn row_line<'a>(row: &Row<'a>) -> Line<'a> {
    let cursor = if row.is_cursor { ">" } else { " " };
    let (marker_style, suffix) = match row.kind {
        RowKind::Directory { .. } => (Style::default().fg(Color::Blue), "/"),
        RowKind::File { selected: true } => (Style::default().fg(Color::Green), ""),
        RowKind::File { selected: false } => (Style::default(), ""),
    };

    let line = Line::from(vec![
        Span::raw(cursor),
        Span::raw("  ".repeat(row.depth)),
        Span::styled(row.marker(), marker_style),
        Span::raw(" "),
        Span::raw(row.name),
        Span::raw(suffix),
    ]);

    if row.is_cursor {
        line.style(Style::default().add_modifier(Modifier::REVERSED))
    } else {
        line
    }
}
