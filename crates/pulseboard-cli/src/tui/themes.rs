use ratatui::style::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeName {
    #[default]
    Blue,
    Green,
    Teal,
    Purple,
    Mono,
}

impl ThemeName {
    pub fn all() -> [ThemeName; 5] {
        [
            ThemeName::Blue,
            ThemeName::Green,
            ThemeName::Teal,
            ThemeName::Purple,
            ThemeName::Mono,
        ]
    }

    pub fn parse(s: &str) -> Option<ThemeName> {
        match s.to_lowercase().as_str() {
            "blue" => Some(ThemeName::Blue),
            "green" => Some(ThemeName::Green),
            "teal" => Some(ThemeName::Teal),
            "purple" => Some(ThemeName::Purple),
            "mono" | "monochrome" => Some(ThemeName::Mono),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeName::Blue => "blue",
            ThemeName::Green => "green",
            ThemeName::Teal => "teal",
            ThemeName::Purple => "purple",
            ThemeName::Mono => "mono",
        }
    }

    pub fn next(&self) -> ThemeName {
        let all = Self::all();
        let idx = all.iter().position(|t| t == self).unwrap_or(0);
        all[(idx + 1) % all.len()]
    }
}

/// Cosmetic palette consumed by every widget. Themes never change layout
/// or behavior.
#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub name: ThemeName,
    pub accent: Color,
    pub border: Color,
    pub text: Color,
    pub muted: Color,
    pub highlight: Color,
    pub positive: Color,
    pub negative: Color,
    /// Series colors: organic, paid, sessions, conversions.
    pub series: [Color; 4],
}

impl Theme {
    pub fn from_name(name: ThemeName) -> Self {
        match name {
            ThemeName::Blue => Self {
                name,
                accent: Color::Rgb(96, 165, 250),
                border: Color::Rgb(55, 65, 81),
                text: Color::Rgb(229, 231, 235),
                muted: Color::Rgb(120, 130, 145),
                highlight: Color::Rgb(30, 58, 138),
                positive: Color::Rgb(74, 222, 128),
                negative: Color::Rgb(248, 113, 113),
                series: [
                    Color::Rgb(96, 165, 250),
                    Color::Rgb(251, 191, 36),
                    Color::Rgb(52, 211, 153),
                    Color::Rgb(244, 114, 182),
                ],
            },
            ThemeName::Green => Self {
                name,
                accent: Color::Rgb(74, 222, 128),
                border: Color::Rgb(46, 66, 52),
                text: Color::Rgb(229, 231, 235),
                muted: Color::Rgb(110, 140, 120),
                highlight: Color::Rgb(20, 83, 45),
                positive: Color::Rgb(74, 222, 128),
                negative: Color::Rgb(248, 113, 113),
                series: [
                    Color::Rgb(74, 222, 128),
                    Color::Rgb(253, 224, 71),
                    Color::Rgb(45, 212, 191),
                    Color::Rgb(192, 132, 252),
                ],
            },
            ThemeName::Teal => Self {
                name,
                accent: Color::Rgb(45, 212, 191),
                border: Color::Rgb(40, 70, 70),
                text: Color::Rgb(226, 232, 240),
                muted: Color::Rgb(100, 140, 140),
                highlight: Color::Rgb(19, 78, 74),
                positive: Color::Rgb(52, 211, 153),
                negative: Color::Rgb(251, 113, 133),
                series: [
                    Color::Rgb(45, 212, 191),
                    Color::Rgb(250, 204, 21),
                    Color::Rgb(125, 211, 252),
                    Color::Rgb(232, 121, 249),
                ],
            },
            ThemeName::Purple => Self {
                name,
                accent: Color::Rgb(192, 132, 252),
                border: Color::Rgb(68, 52, 92),
                text: Color::Rgb(237, 233, 254),
                muted: Color::Rgb(139, 120, 165),
                highlight: Color::Rgb(76, 29, 149),
                positive: Color::Rgb(74, 222, 128),
                negative: Color::Rgb(248, 113, 113),
                series: [
                    Color::Rgb(192, 132, 252),
                    Color::Rgb(251, 146, 60),
                    Color::Rgb(103, 232, 249),
                    Color::Rgb(244, 114, 182),
                ],
            },
            ThemeName::Mono => Self {
                name,
                accent: Color::White,
                border: Color::DarkGray,
                text: Color::Gray,
                muted: Color::DarkGray,
                highlight: Color::Rgb(60, 60, 60),
                positive: Color::White,
                negative: Color::Gray,
                series: [
                    Color::White,
                    Color::Gray,
                    Color::Rgb(180, 180, 180),
                    Color::Rgb(120, 120, 120),
                ],
            },
        }
    }
}
