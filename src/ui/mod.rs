pub mod lesson_list;
pub mod results;
pub mod typing_area;

use ratatui::style::Color;

/// Fixed high-contrast palette, tuned to stay readable on dark terminals.
/// No theming layer; kids get one look.
pub struct Palette;

impl Palette {
    pub const BG: Color = Color::Rgb(0x1e, 0x1e, 0x2e);
    pub const TEXT: Color = Color::Rgb(0xcd, 0xd6, 0xf4);
    pub const CORRECT: Color = Color::Rgb(0xa6, 0xe3, 0xa1);
    pub const ERROR: Color = Color::Rgb(0xf3, 0x8b, 0xa8);
    pub const ERROR_BG: Color = Color::Rgb(0x45, 0x27, 0x3a);
    pub const PENDING: Color = Color::Rgb(0x58, 0x5b, 0x70);
    pub const CURSOR_FG: Color = Color::Rgb(0x1e, 0x1e, 0x2e);
    pub const CURSOR_BG: Color = Color::Rgb(0xf5, 0xe0, 0xdc);
    pub const ACCENT: Color = Color::Rgb(0x89, 0xb4, 0xfa);
    pub const STAR: Color = Color::Rgb(0xf9, 0xe2, 0xaf);
    pub const LOCKED: Color = Color::Rgb(0x45, 0x47, 0x5a);
    pub const HEADER_BG: Color = Color::Rgb(0x31, 0x32, 0x44);
    pub const HEADER_FG: Color = Color::Rgb(0xcd, 0xd6, 0xf4);
}

/// "★★★☆☆"-style bar for a 0-5 star count.
pub fn star_bar(stars: u8) -> String {
    let filled = usize::from(stars.min(5));
    let mut bar = String::new();
    for _ in 0..filled {
        bar.push('\u{2605}');
    }
    for _ in filled..5 {
        bar.push('\u{2606}');
    }
    bar
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_star_bar() {
        assert_eq!(star_bar(0), "\u{2606}\u{2606}\u{2606}\u{2606}\u{2606}");
        assert_eq!(star_bar(3), "\u{2605}\u{2605}\u{2605}\u{2606}\u{2606}");
        assert_eq!(star_bar(5), "\u{2605}\u{2605}\u{2605}\u{2605}\u{2605}");
        assert_eq!(star_bar(9), "\u{2605}\u{2605}\u{2605}\u{2605}\u{2605}");
    }
}
