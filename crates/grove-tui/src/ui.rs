//! Snapshot rendering.
//!
//! Pure presentation: everything drawn here comes out of the
//! `SessionSnapshot`. Layout follows the classic proportions -- tree in
//! the middle ending at three quarters height, quote at five sixths,
//! countdown near the bottom, preset menus down the left and right edges,
//! and a three-row bar across the top for prompts, the loading spinner,
//! and notifications.

use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::Text,
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use grove_core::{Season, SessionSnapshot};

const SPINNER: [&str; 15] = [
    "[    ]", "[=   ]", "[==  ]", "[=== ]", "[ ===]", "[  ==]", "[   =]", "[    ]", "[   =]",
    "[  ==]", "[ ===]", "[====]", "[=== ]", "[==  ]", "[=   ]",
];

pub fn draw(frame: &mut Frame, snap: &SessionSnapshot, input_buffer: &str) {
    let area = frame.size();
    if area.width < 12 || area.height < 10 {
        frame.render_widget(Paragraph::new("grove needs a larger terminal"), area);
        return;
    }

    if snap.paused {
        centered_line(
            frame,
            area.height * 3 / 5,
            "PAUSED",
            Style::default().add_modifier(Modifier::BOLD),
        );
        return;
    }

    draw_weather(frame, snap);
    draw_tree(frame, snap);
    draw_quote(frame, snap);
    draw_menus(frame, snap);
    draw_timer(frame, snap);
    draw_top_bar(frame, snap, input_buffer);
}

fn centered_line(frame: &mut Frame, y: u16, text: &str, style: Style) {
    let area = frame.size();
    if y >= area.height {
        return;
    }
    let rect = Rect::new(0, y, area.width, 1);
    frame.render_widget(
        Paragraph::new(text).style(style).alignment(Alignment::Center),
        rect,
    );
}

fn draw_weather(frame: &mut Frame, snap: &SessionSnapshot) {
    let color = match snap.season {
        Season::Snow => Color::White,
        _ => Color::Cyan,
    };
    let area = frame.size();
    let buf = frame.buffer_mut();
    for p in &snap.weather {
        if p.col < area.width && p.row < area.height {
            buf.get_mut(p.col, p.row)
                .set_char(p.glyph)
                .set_style(Style::default().fg(color));
        }
    }
}

fn draw_tree(frame: &mut Frame, snap: &SessionSnapshot) {
    let area = frame.size();
    let lines: Vec<&str> = snap.art.lines().collect();
    let height = lines.len() as u16;
    let bottom = area.height * 3 / 4;
    let top = bottom.saturating_sub(height);
    let rect = Rect::new(0, top, area.width, height.min(area.height - top));
    frame.render_widget(
        Paragraph::new(Text::from(snap.art.as_str()))
            .style(Style::default().fg(Color::Green))
            .alignment(Alignment::Center),
        rect,
    );
    centered_line(
        frame,
        bottom,
        &format!("age: {}", snap.age as u64),
        Style::default().fg(Color::Yellow),
    );
}

fn draw_quote(frame: &mut Frame, snap: &SessionSnapshot) {
    let area = frame.size();
    let y = area.height * 5 / 6;
    let height = area.height.saturating_sub(y).min(2).max(1);
    let rect = Rect::new(0, y, area.width, height);
    frame.render_widget(
        Paragraph::new(snap.quote.as_str())
            .style(Style::default().fg(Color::LightGreen))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        rect,
    );
}

fn draw_menus(frame: &mut Frame, snap: &SessionSnapshot) {
    if !snap.menu_visible {
        return;
    }
    let area = frame.size();
    let buf = frame.buffer_mut();

    let timer_active = snap.active_list == grove_core::MenuList::Timer;
    let start_y = |len: usize| {
        (area.height.saturating_sub(len as u16 * 2)) / 2
    };

    let y0 = start_y(snap.timer_items.len());
    for (i, item) in snap.timer_items.iter().enumerate() {
        let selected = timer_active && i == snap.selected;
        let style = if selected {
            Style::default().add_modifier(Modifier::REVERSED)
        } else {
            Style::default()
        };
        let x = area.width / 25 + if selected { 4 } else { 0 };
        buf.set_string(x, y0 + i as u16 * 2, format!(" {item} "), style);
    }

    let y0 = start_y(snap.feature_items.len());
    for (i, item) in snap.feature_items.iter().enumerate() {
        let selected = !timer_active && i == snap.selected;
        let style = if selected {
            Style::default().add_modifier(Modifier::REVERSED)
        } else {
            Style::default()
        };
        let text = format!(" {item} ");
        let offset = text.len() as u16 + if selected { 4 } else { 0 };
        let x = (area.width * 24 / 25).saturating_sub(offset);
        buf.set_string(x, y0 + i as u16 * 2, text, style);
    }
}

fn draw_timer(frame: &mut Frame, snap: &SessionSnapshot) {
    let area = frame.size();
    let y = area.height * 10 / 11;
    if let Some(line) = &snap.timer_line {
        centered_line(frame, y, line, Style::default().fg(Color::Cyan));
    }
    if let Some(banner) = &snap.banner {
        let y = if snap.timer_line.is_some() {
            y.saturating_sub(1)
        } else {
            y
        };
        centered_line(
            frame,
            y,
            banner,
            Style::default().add_modifier(Modifier::BOLD | Modifier::SLOW_BLINK),
        );
    }
}

/// Top three rows: modal prompt, then notification, then the loading
/// spinner, in that priority order.
fn draw_top_bar(frame: &mut Frame, snap: &SessionSnapshot, input_buffer: &str) {
    let area = frame.size();
    let line = if let Some(prompt) = &snap.input_prompt {
        Some((format!("{prompt}{input_buffer}_"), Style::default()))
    } else if let Some(n) = &snap.notification {
        let style = if n.emphasize {
            Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED)
        } else {
            Style::default().add_modifier(Modifier::BOLD)
        };
        Some((n.text.clone(), style))
    } else if snap.loading {
        Some((
            format!("GETTING AUDIO  {}", SPINNER[snap.spinner_frame % SPINNER.len()]),
            Style::default(),
        ))
    } else {
        None
    };

    let Some((text, style)) = line else {
        return;
    };
    let rect = Rect::new(0, 0, area.width, 3);
    let block = Block::default().borders(Borders::ALL);
    let inner = block.inner(rect);
    frame.render_widget(block, rect);
    frame.render_widget(Paragraph::new(text).style(style), inner);
}
