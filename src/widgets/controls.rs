use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style, Stylize},
    widgets::{Paragraph, Widget},
};

/// Bottom key-hint bar with an optional right-aligned status message.
#[derive(Default)]
pub struct Controls<'a> {
    pub hints: &'a [(&'a str, &'a str)],
    pub status: Option<&'a str>,
    pub is_error: bool,
}

impl<'a> Controls<'a> {
    pub fn new(hints: &'a [(&'a str, &'a str)]) -> Self {
        Self {
            hints,
            status: None,
            is_error: false,
        }
    }

    pub fn with_status(mut self, status: &'a str, is_error: bool) -> Self {
        self.status = Some(status);
        self.is_error = is_error;
        self
    }
}

impl Widget for &Controls<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut constraints = self.hints.iter().fold(vec![], |mut acc, (key, action)| {
            acc.push(Constraint::Length(key.chars().count() as u16 + 2));
            acc.push(Constraint::Length(action.chars().count() as u16 + 1));
            acc
        });
        constraints.push(Constraint::Fill(1));

        let layout = Layout::new(Direction::Horizontal, constraints).split(area);
        let color = Color::DarkGray;
        let base_style = Style::default();

        for (i, (key, action)) in self.hints.iter().enumerate() {
            let j = i * 2;
            Paragraph::new(*key)
                .style(base_style.bold())
                .centered()
                .render(layout[j], buf);
            Paragraph::new(*action)
                .style(base_style.bg(color))
                .render(layout[j + 1], buf);
        }

        let fill_idx = self.hints.len() * 2;
        let fg = if self.is_error {
            Color::Red
        } else {
            Color::White
        };
        Paragraph::new(self.status.unwrap_or(""))
            .style(base_style.bg(color).fg(fg))
            .right_aligned()
            .render(layout[fill_idx], buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_hints_and_status() {
        let hints = [("q", "Quit"), ("Tab", "Next")];
        let controls = Controls::new(&hints).with_status("12 records", false);
        let area = Rect::new(0, 0, 40, 1);
        let mut buf = Buffer::empty(area);
        (&controls).render(area, &mut buf);
        let line: String = (0..area.width)
            .map(|x| buf[(x, 0)].symbol().to_string())
            .collect();
        assert!(line.contains("Quit"));
        assert!(line.contains("Tab"));
        assert!(line.trim_end().ends_with("12 records"));
    }
}
