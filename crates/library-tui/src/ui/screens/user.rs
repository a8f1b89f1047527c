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
    let (title, lines) = match app.selected_book() {
        Some(book) => {
            let lines = vec![
                Line::from(vec![
                    Span::styled("Title:    ", styles::highlight_style()),
                    Span::raw(book.title.clone()),
                ]),
                Line::from(vec![
                    Span::styled("Author:   ", styles::highlight_style()),
                    Span::raw(book.author.clone()),
                ]),
                Line::from(vec![
                    Span::styled("Borrowed: ", styles::highlight_style()),
                    Span::styled(
                        book.borrowed_label(),
                        styles::availability_style(book.is_borrowed),
                    ),
                ]),
                Line::from(""),
                // Only the action matching the current state is enabled
                key_hint("b", "Borrow", book.can_borrow()),
                key_hint("r", "Return", book.can_return()),
            ];
            (format!(" {} ", book.title), lines)
        }
        None => (
            " Book ".to_string(),
            vec![Line::from(Span::styled(
                "No books available",
                styles::muted_style(),
            ))],
        ),
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
