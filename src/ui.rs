pub mod screen;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap},
};

use studystack::app::{App, Dialog};

use crate::ui::screen::current_view;

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 1;
const DIALOG_WIDTH: u16 = 64;

/// Wrapper so the binary can implement `Widget` for the library's `App`
pub struct AppWidget<'a>(pub &'a App);

impl Widget for AppWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let app = self.0;
        current_view(app.screen).render(app, area, buf);

        if let Some(dialog) = &app.dialog {
            render_dialog(dialog, area, buf);
        }
    }
}

/// A rect of at most `width` x `height` centered in `area`
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn render_dialog(dialog: &Dialog, area: Rect, buf: &mut Buffer) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let italic_style = Style::default().add_modifier(Modifier::ITALIC);

    let (title, body, legend, border) = match dialog {
        Dialog::Info { title, body } => {
            let color = if title == "Error" {
                Color::Red
            } else {
                Color::Cyan
            };
            (title, body, "(enter) ok", color)
        }
        Dialog::Confirm { title, body, .. } => (title, body, "(y)es / (n)o", Color::Yellow),
    };

    let inner_width = DIALOG_WIDTH.saturating_sub(4).max(1) as usize;
    let body_lines: usize = body
        .lines()
        .map(|l| {
            let w = unicode_width::UnicodeWidthStr::width(l);
            w.div_ceil(inner_width).max(1)
        })
        .sum();
    // borders + blank line + legend
    let height = body_lines as u16 + 4;
    let rect = centered_rect(DIALOG_WIDTH, height, area);

    Clear.render(rect, buf);

    let mut lines: Vec<Line> = body.lines().map(|l| Line::from(l.to_string())).collect();
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(legend, italic_style)).alignment(Alignment::Right));

    Paragraph::new(Text::from(lines))
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border))
                .title(Span::styled(format!(" {} ", title), bold_style)),
        )
        .render(rect, buf);
}
