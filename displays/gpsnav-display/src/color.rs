//! 16-bit RGB565 pixels

/// Packed 5-6-5 color as the panel expects it
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Rgb565(pub u16);

impl Rgb565 {
    pub const BLACK: Self = Self(0x0000);
    pub const RED: Self = Self(0xF800);
    pub const GREEN: Self = Self(0x07E0);
    pub const YELLOW: Self = Self(0xFFE0);
    pub const BLUE: Self = Self(0x001F);
    pub const MAGENTA: Self = Self(0xF81F);
    pub const CYAN: Self = Self(0x07FF);
    pub const WHITE: Self = Self(0xFFFF);

    /// ANSI color order, indexed by `SGR - 30` / `SGR - 40`
    pub const ANSI: [Self; 8] = [
        Self::BLACK,
        Self::RED,
        Self::GREEN,
        Self::YELLOW,
        Self::BLUE,
        Self::MAGENTA,
        Self::CYAN,
        Self::WHITE,
    ];

    /// Decode one raster word (high byte first)
    pub const fn from_be_bytes(bytes: [u8; 2]) -> Self {
        Self(u16::from_be_bytes(bytes))
    }

    /// Raw packed value
    pub const fn raw(self) -> u16 {
        self.0
    }

    /// Look up a palette entry by name (`"black"` .. `"white"`)
    pub fn from_name(name: &str) -> Option<Self> {
        const NAMES: [&str; 8] = [
            "black", "red", "green", "yellow", "blue", "magenta", "cyan", "white",
        ];
        NAMES
            .iter()
            .position(|candidate| candidate.eq_ignore_ascii_case(name))
            .map(|index| Self::ANSI[index])
    }
}
