use colored::Color;

pub const PRIMARY: Color = Color::BrightGreen;
pub const ACCENT: Color = Color::Yellow;
pub const SEPARATOR: Color = Color::BrightBlack;
pub const TEXT_DEFAULT: Color = Color::White;

pub const LIVE: Color = Color::Green;
pub const BAD_STATUS: Color = Color::Red;
pub const TRANSPORT: Color = Color::Magenta;
pub const UNPROBED: Color = Color::BrightBlack;
