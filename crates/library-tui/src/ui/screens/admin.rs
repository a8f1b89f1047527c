use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::app::App;
use crate::ui::styles;

use super::{key_hint, render_book_list};

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
        .split(area);

    render_book_list(frame, app, chunks[0]);
    render_detail(frame, app, chunks[1]);
}

fn render_detail(frame: &mut Frame, app: &App, area: Rect) {
    let selected = app.selected_book();
    let mut lines = vec![];

    match selected {
        Some(book) => {
            lines.push(Line::from(vec![
                Span::styled("Title:    ", styles::highlight_style()),
                Span::raw(book.title.clone()),
            ]));
            lines.push(Line::from(vec![
                Span::styled("Author:   ", styles::highlight_style()),
                Span::raw(book.author.clone()),
            ]));
            lines.push(Line::from(vec![
                Span::styled("Borrowed: ", styles::highlight_style()),
                Span::styled(
                    book.borrowed_label(),
                    styles::availability_style(book.is_borrowed),
                ),
            ]));
        }
        None => {
            lines.push(Line::from(Span::styled(
                "No books yet",
                styles::muted_style(),
            )));
        }
    }

    lines.push(Line::from(""));
    lines.push(key_hint("a", "Add a book", true));
    lines.push(key_hint("e/Enter", "Edit selected", selected.is_some()));
    lines.push(key_hint("d", "Delete selected", selected.is_some()));

    let title = match selected {
        Some(book) => format!(" Book #{} ", book.id),
        None => " Book ".to_string(),
    };

    let block = Block::default()
        .title(title)
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}
