/// The five color schemes. Every scheme supplies a foreground, a
/// background and a border color; the bars pick a scheme per element
/// and window borders use the scheme's border entry.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Scheme {
    Normal,
    Selected,
    Visible,
    Minimized,
    Urgent,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SchemePart {
    Fg,
    Bg,
    Border,
}

pub const SCHEME_COUNT: usize = 5;
pub const PART_COUNT: usize = 3;

impl Scheme {
    /// RGBA values for the scheme, indexed fg / bg / border.
    pub fn rgba(&self) -> [[u8; 4]; PART_COUNT] {
        match self {
            Scheme::Normal => [
                [0xbb, 0xbb, 0xbb, 0xFF],
                [0x22, 0x22, 0x22, 0xFF],
                [0x44, 0x44, 0x44, 0xFF],
            ],
            Scheme::Selected => [
                [0xee, 0xee, 0xee, 0xFF],
                [0x00, 0x55, 0x77, 0xFF],
                [0x00, 0x55, 0x77, 0xFF],
            ],
            Scheme::Visible => [
                [0xbb, 0xbb, 0xbb, 0xFF],
                [0x00, 0x22, 0x33, 0xFF],
                [0x00, 0x22, 0x33, 0xFF],
            ],
            Scheme::Minimized => [
                [0x66, 0x66, 0x66, 0xFF],
                [0x22, 0x22, 0x22, 0xFF],
                [0x44, 0x44, 0x44, 0xFF],
            ],
            Scheme::Urgent => [
                [0xbb, 0xbb, 0xbb, 0xFF],
                [0xd8, 0x64, 0x7e, 0xFF],
                [0xd8, 0x64, 0x7e, 0xFF],
            ],
        }
    }
}

pub const ALL_SCHEMES: [Scheme; SCHEME_COUNT] = [
    Scheme::Normal,
    Scheme::Selected,
    Scheme::Visible,
    Scheme::Minimized,
    Scheme::Urgent,
];
