/// 24-bit pixel color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const OFF: Self = Self(0, 0, 0);
    pub const RED: Self = Self(255, 0, 0);
    pub const GREEN: Self = Self(0, 255, 0);
    pub const BLUE: Self = Self(0, 0, 255);
    pub const YELLOW: Self = Self(255, 255, 0);
    pub const WHITE: Self = Self(255, 255, 255);
    pub const PURPLE: Self = Self(128, 0, 128);
    pub const CYAN: Self = Self(0, 247, 255);

    pub fn is_off(&self) -> bool {
        *self == Self::OFF
    }
}

impl std::fmt::Display for Rgb {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}
