//! Palette and style table for the dashboard
//!
//! The renderer receives a `&Theme` argument; nothing here is global, so
//! tests can build a theme per render and headless subcommands never touch
//! style state.

use ratatui::style::{Color, Modifier, Style};

use devdeck_core::catalog::ServiceStatus;

/// The dashboard's color tokens: green header bar, mint accent, one color
/// per service status
#[derive(Clone, Debug)]
pub struct Palette {
    pub header_fg: Color,
    pub header_bg: Color,
    /// Active tab, filter prompt, spinner
    pub accent: Color,
    /// Inactive tabs, descriptions, footer
    pub dim: Color,
    pub running: Color,
    pub stopped: Color,
    pub unknown: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            header_fg: Color::Rgb(255, 253, 245),
            header_bg: Color::Rgb(37, 160, 101),
            accent: Color::Rgb(1, 250, 198),
            dim: Color::Rgb(98, 98, 98),
            running: Color::Rgb(4, 181, 117),
            stopped: Color::Rgb(239, 68, 68),
            unknown: Color::Rgb(245, 158, 11),
        }
    }
}

/// Style lookups over a [`Palette`]
///
/// Plain body text stays unstyled (terminal default foreground), so there
/// is no token for it.
#[derive(Clone, Debug, Default)]
pub struct Theme {
    pub palette: Palette,
}

#[allow(dead_code)]
impl Theme {
    pub fn new(palette: Palette) -> Self {
        Self { palette }
    }

    pub fn header(&self) -> Style {
        Style::default()
            .fg(self.palette.header_fg)
            .bg(self.palette.header_bg)
            .add_modifier(Modifier::BOLD)
    }

    /// Project name next to the header badge
    pub fn title(&self) -> Style {
        Style::default().add_modifier(Modifier::BOLD)
    }

    pub fn tab(&self, active: bool) -> Style {
        if active {
            Style::default()
                .fg(self.palette.accent)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(self.palette.dim)
        }
    }

    pub fn status(&self, status: ServiceStatus) -> Style {
        let color = match status {
            ServiceStatus::Running => self.palette.running,
            ServiceStatus::Stopped => self.palette.stopped,
            ServiceStatus::Unknown => self.palette.unknown,
        };
        Style::default().fg(color)
    }

    /// Highlight for the selected list entry
    pub fn selected(&self) -> Style {
        Style::default()
            .fg(self.palette.accent)
            .add_modifier(Modifier::BOLD)
    }

    pub fn accent(&self) -> Style {
        Style::default().fg(self.palette.accent)
    }

    pub fn dim(&self) -> Style {
        Style::default().fg(self.palette.dim)
    }

    /// Marker line of a completed command block
    pub fn ok(&self) -> Style {
        Style::default().fg(self.palette.running)
    }

    /// Marker line of a failed command block
    pub fn fail(&self) -> Style {
        Style::default().fg(self.palette.stopped)
    }
}
