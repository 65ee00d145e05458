use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use studystack::{
    app::{App, Field, Screen, MENU_ITEMS},
    audio::AudioStatus,
    deck::DeckStatus,
};

use crate::ui::{HORIZONTAL_MARGIN, VERTICAL_MARGIN};

const CARD_MAX_WIDTH: u16 = 80;
const CARD_HEIGHT: u16 = 9;

/// A UI screen boundary: draws one `Screen` of the app
pub trait View {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer);
}

/// Title screen with the start/instructions/about/exit menu
pub struct MenuView;

impl View for MenuView {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        let bold_style = Style::default().add_modifier(Modifier::BOLD);

        let mut lines = vec![
            Line::from(Span::styled(
                "Welcome to StudyStack",
                bold_style.fg(Color::Cyan),
            )),
            Line::from(Span::styled(
                "Learn. Play. Remember.",
                Style::default().add_modifier(Modifier::ITALIC),
            )),
            Line::from(""),
        ];

        for (idx, item) in MENU_ITEMS.iter().enumerate() {
            let label = format!("  {}  ", item);
            lines.push(if idx == app.menu_selected {
                Line::from(Span::styled(
                    format!("> {} <", label.trim()),
                    bold_style.fg(Color::Black).bg(Color::LightCyan),
                ))
            } else {
                Line::from(Span::styled(label, Style::default().fg(Color::Gray)))
            });
        }

        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "(↑/↓) choose / (enter) select / (q)uit",
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        )));

        let height = lines.len() as u16;
        let rect = crate::ui::centered_rect(area.width, height, area);
        Paragraph::new(Text::from(lines))
            .alignment(Alignment::Center)
            .render(rect, buf);
    }
}

/// The flashcard itself, plus score, navigation state and the answer box
pub struct QuizView;

impl QuizView {
    fn card_text(app: &App) -> (String, Style) {
        let face = Style::default().fg(Color::White).add_modifier(Modifier::BOLD);

        if let Some(reveal) = app.reveal.as_ref().filter(|r| r.is_face_up()) {
            return if reveal.verdict.correct {
                (
                    format!("Correct!\nAnswer: {}", reveal.verdict.answer),
                    face.bg(Color::Green),
                )
            } else {
                (
                    format!("The correct\nAnswer is: {}", reveal.verdict.answer),
                    face.bg(Color::Red),
                )
            };
        }

        let view = app.deck.view();
        let text = match view.status {
            DeckStatus::Finished { .. } => format!("🏁 {}", view.headline),
            _ => view.headline,
        };
        (text, Style::default().add_modifier(Modifier::ITALIC))
    }

    fn sound_label(status: AudioStatus) -> &'static str {
        match status {
            AudioStatus::Unavailable => "No Sound",
            AudioStatus::Playing => "🔊 (^s) Mute",
            AudioStatus::Muted | AudioStatus::Stopped => "🔈 (^s) Unmute",
        }
    }
}

impl View for QuizView {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let italic_style = Style::default().add_modifier(Modifier::ITALIC);
        let enabled_style = bold_style.fg(Color::LightMagenta);
        let disabled_style = Style::default().fg(Color::DarkGray);

        let view = app.deck.view();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints(
                [
                    Constraint::Length(1), // score + sound
                    Constraint::Length(1), // card position
                    Constraint::Min(3),    // card
                    Constraint::Length(3), // answer box
                    Constraint::Length(1), // prev / next
                    Constraint::Length(1), // status
                    Constraint::Length(1), // legend
                ]
                .as_ref(),
            )
            .split(area);

        let header = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)].as_ref())
            .split(chunks[0]);
        Paragraph::new(Span::styled(format!("Score: {}", view.score), bold_style))
            .alignment(Alignment::Left)
            .render(header[0], buf);
        Paragraph::new(Span::styled(
            Self::sound_label(app.sound_status()),
            Style::default().fg(Color::Gray),
        ))
        .alignment(Alignment::Right)
        .render(header[1], buf);

        let position = match (view.position, view.status) {
            (Some((idx, total)), _) => format!("Card {} / {}", idx, total),
            (None, DeckStatus::Finished { .. }) => "All cards answered".to_string(),
            (None, _) => String::new(),
        };
        Paragraph::new(Span::styled(position, bold_style))
            .alignment(Alignment::Center)
            .render(chunks[1], buf);

        // card, narrowed while flipping
        let (text, face_style) = Self::card_text(app);
        let widest = text.lines().map(|l| l.width()).max().unwrap_or(0);
        let full_width = (widest.min(u16::MAX as usize) as u16)
            .saturating_add(8)
            .clamp(30, CARD_MAX_WIDTH);
        let factor = app.reveal.as_ref().map_or(1.0, |r| r.flip_factor());
        let width = ((full_width as f64 * factor).round() as u16).max(2);
        let card_rect = crate::ui::centered_rect(width, CARD_HEIGHT, chunks[2]);

        let text_lines = text.lines().count() as u16;
        let inner_height = card_rect.height.saturating_sub(2);
        let mut lines: Vec<Line> = (0..inner_height.saturating_sub(text_lines) / 2)
            .map(|_| Line::from(""))
            .collect();
        lines.extend(text.lines().map(|l| Line::from(l.to_string())));

        Paragraph::new(Text::from(lines))
            .style(face_style)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Cyan)),
            )
            .render(card_rect, buf);

        let input_style = if app.is_revealing() {
            Style::default().add_modifier(Modifier::DIM)
        } else {
            bold_style
        };
        Paragraph::new(Line::from(vec![
            Span::styled(app.answer_input.clone(), input_style),
            Span::styled("_", Style::default().add_modifier(Modifier::SLOW_BLINK)),
        ]))
        .block(Block::default().borders(Borders::ALL).title("Your Answer"))
        .render(chunks[3], buf);

        Paragraph::new(Line::from(vec![
            Span::styled(
                "<< Prev",
                if view.can_prev {
                    enabled_style
                } else {
                    disabled_style
                },
            ),
            Span::raw("      "),
            Span::styled(
                "Next >>",
                if view.can_next {
                    enabled_style
                } else {
                    disabled_style
                },
            ),
        ]))
        .alignment(Alignment::Center)
        .render(chunks[4], buf);

        if let Some(status) = &app.status {
            Paragraph::new(Span::styled(status.clone(), Style::default().fg(Color::Yellow)))
                .alignment(Alignment::Center)
                .render(chunks[5], buf);
        }

        Paragraph::new(Span::styled(
            "(enter) submit / (tab) next / (shift-tab) prev / (^n) add / (^d) delete / (^r) restart / (esc) menu",
            italic_style,
        ))
        .wrap(Wrap { trim: true })
        .render(chunks[6], buf);
    }
}

/// Two-field form for a new card
pub struct AddCardView;

impl View for AddCardView {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        let focused = Style::default()
            .fg(Color::LightCyan)
            .add_modifier(Modifier::BOLD);
        let unfocused = Style::default().fg(Color::Gray);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints(
                [
                    Constraint::Length(1), // title
                    Constraint::Length(6), // question
                    Constraint::Length(3), // answer
                    Constraint::Length(1), // status
                    Constraint::Length(1), // legend
                    Constraint::Min(0),
                ]
                .as_ref(),
            )
            .split(area);

        Paragraph::new(Span::styled(
            "Add Flashcard",
            Style::default().add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center)
        .render(chunks[0], buf);

        let field = |label: &'static str, value: &str, which: Field| {
            let style = if app.form.focus == which {
                focused
            } else {
                unfocused
            };
            let cursor = if app.form.focus == which { "_" } else { "" };
            Paragraph::new(format!("{}{}", value, cursor))
                .wrap(Wrap { trim: false })
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(style)
                        .title(label),
                )
        };

        field("Question", &app.form.question, Field::Question).render(chunks[1], buf);
        field("Answer", &app.form.answer, Field::Answer).render(chunks[2], buf);

        if let Some(status) = &app.status {
            Paragraph::new(Span::styled(status.clone(), Style::default().fg(Color::Red)))
                .alignment(Alignment::Center)
                .render(chunks[3], buf);
        }

        Paragraph::new(Span::styled(
            "(tab) switch field / (enter) next field, save / (esc) cancel",
            Style::default().add_modifier(Modifier::ITALIC),
        ))
        .render(chunks[4], buf);
    }
}

/// Helper to construct the view for the current screen
pub fn current_view(screen: Screen) -> Box<dyn View> {
    match screen {
        Screen::Menu => Box::new(MenuView),
        Screen::Quiz => Box::new(QuizView),
        Screen::AddCard => Box::new(AddCardView),
    }
}
