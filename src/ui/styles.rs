use ratatui::style::{Color, Modifier, Style};

pub struct LyricStyles {
    pub title: Style,
    pub header: Style,
    pub before: Style,
    pub current: Style,
    pub highlight: Style,
    pub after: Style,
}

impl Default for LyricStyles {
    fn default() -> Self {
        Self {
            title: Style::default().add_modifier(Modifier::BOLD),
            header: Style::default().add_modifier(Modifier::DIM),
            before: Style::default().add_modifier(Modifier::ITALIC | Modifier::DIM),
            current: Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
            highlight: Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::REVERSED),
            after: Style::default(),
        }
    }
}
