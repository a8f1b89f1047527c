//! Book screens shown after login.
//!
//! Both screens share the list panel on the left; the detail panel on the
//! right shows the actions the role allows.

pub mod admin;
pub mod user;

use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

use crate::app::App;
use crate::ui::styles;
use crate::utils::pad_to_width;

/// Width of the title column in the book list
const TITLE_COLUMN_WIDTH: usize = 28;

/// Width of the author column in the book list
const AUTHOR_COLUMN_WIDTH: usize = 20;

fn render_book_list(frame: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app
        .books
        .iter()
        .enumerate()
        .map(|(i, book)| {
            let style = if i == app.selection {
                styles::selected_style()
            } else {
                styles::list_item_style()
            };

            let line = Line::from(vec![
                Span::styled(format!("{:>4}  ", book.id), styles::muted_style()),
                Span::raw(pad_to_width(&book.title, TITLE_COLUMN_WIDTH)),
                Span::raw("  "),
                Span::raw(pad_to_width(&book.author, AUTHOR_COLUMN_WIDTH)),
                Span::raw("  "),
                Span::styled(
                    if book.is_borrowed { "borrowed" } else { "available" },
                    styles::availability_style(book.is_borrowed),
                ),
            ]);

            ListItem::new(line).style(style)
        })
        .collect();

    let block = Block::default()
        .title(format!(" Books ({}) ", app.books.len()))
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    let list = List::new(items).block(block);

    let mut state = ListState::default();
    if !app.books.is_empty() {
        state.select(Some(app.selection));
    }

    frame.render_stateful_widget(list, area, &mut state);
}

fn key_hint(key: &str, desc: &str, enabled: bool) -> Line<'static> {
    let (key_style, desc_style) = if enabled {
        (styles::help_key_style(), styles::help_desc_style())
    } else {
        (styles::muted_style(), styles::muted_style())
    };
    Line::from(vec![
        Span::styled(format!("  {:<8}", key), key_style),
        Span::styled(desc.to_string(), desc_style),
    ])
}
