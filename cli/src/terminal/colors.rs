use colored::Color;

pub const PRIMARY: Color = Color::TrueColor { r: 96, g: 200, b: 255 };
pub const SECONDARY: Color = Color::TrueColor { r: 150, g: 150, b: 220 };
pub const ACCENT: Color = Color::TrueColor { r: 255, g: 196, b: 0 };
pub const SEPARATOR: Color = Color::TrueColor { r: 100, g: 100, b: 100 };
pub const TEXT_DEFAULT: Color = Color::TrueColor { r: 220, g: 220, b: 220 };

pub const OPEN: Color = Color::TrueColor { r: 16, g: 185, b: 129 };
pub const CLOSED: Color = Color::TrueColor { r: 120, g: 120, b: 130 };
pub const FILTERED: Color = Color::TrueColor { r: 245, g: 158, b: 11 };
