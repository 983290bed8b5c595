/// An opaque sRGB color token attached to a highlight by the capturing layer.
///
/// The engine never invents colors; it only derives the two fixed variants
/// the markup grammar needs: a `dark` stroke for underlines and a `light`
/// wash for fill backgrounds.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Neutral stroke used when three or more highlights collapse into the
/// generic "many" underline.
pub const MANY_COLOR: Color = Color {
    r: 0x55,
    g: 0x55,
    b: 0x55,
};

impl Color {
    /// Parses a `#rrggbb` or `#rgb` token.
    pub fn parse(token: &str) -> Result<Self, ColorError> {
        let err = || ColorError::Malformed {
            token: token.to_string(),
        };
        let hex = token.strip_prefix('#').ok_or_else(err)?;
        let digits: Vec<u8> = hex
            .bytes()
            .map(|b| match b {
                b'0'..=b'9' => Ok(b - b'0'),
                b'a'..=b'f' => Ok(b - b'a' + 10),
                b'A'..=b'F' => Ok(b - b'A' + 10),
                _ => Err(err()),
            })
            .collect::<Result<_, _>>()?;
        match *digits.as_slice() {
            [r, g, b] => Ok(Self {
                r: r << 4 | r,
                g: g << 4 | g,
                b: b << 4 | b,
            }),
            [r1, r0, g1, g0, b1, b0] => Ok(Self {
                r: r1 << 4 | r0,
                g: g1 << 4 | g0,
                b: b1 << 4 | b0,
            }),
            _ => Err(err()),
        }
    }

    /// Underline-stroke variant: channels scaled toward black.
    /// Integer arithmetic keeps the result identical across platforms.
    pub fn dark(self) -> Color {
        let scale = |c: u8| (c as u16 * 3 / 5) as u8;
        Color {
            r: scale(self.r),
            g: scale(self.g),
            b: scale(self.b),
        }
    }

    /// Fill-background variant: channels mixed 85% toward white.
    pub fn light(self) -> Color {
        let scale = |c: u8| 255 - ((255 - c as u16) * 3 / 20) as u8;
        Color {
            r: scale(self.r),
            g: scale(self.g),
            b: scale(self.b),
        }
    }

    pub fn hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ColorError {
    Malformed { token: String },
}

impl std::fmt::Display for ColorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColorError::Malformed { token } => {
                write!(f, "malformed color token {:?}, expected #rrggbb", token)
            }
        }
    }
}

impl std::error::Error for ColorError {}

#[cfg(test)]
mod tests {
    use super::Color;

    #[test]
    fn parses_long_and_short_forms() {
        assert_eq!(
            Color::parse("#ff8000").unwrap(),
            Color {
                r: 0xff,
                g: 0x80,
                b: 0x00
            }
        );
        assert_eq!(
            Color::parse("#f80").unwrap(),
            Color {
                r: 0xff,
                g: 0x88,
                b: 0x00
            }
        );
        assert!(Color::parse("ff8000").is_err());
        assert!(Color::parse("#ff80").is_err());
        assert!(Color::parse("#gg0000").is_err());
    }

    #[test]
    fn variants_are_stable() {
        let base = Color::parse("#ff9900").unwrap();
        assert_eq!(base.dark().hex(), "#995b00");
        assert_eq!(base.light().hex(), "#fff0d9");
        // Deriving twice keeps darkening; the emitter only ever derives once.
        assert_ne!(base.dark(), base.dark().dark());
    }

    #[test]
    fn hex_round_trips() {
        let color = Color::parse("#1a2b3c").unwrap();
        assert_eq!(Color::parse(&color.hex()).unwrap(), color);
    }
}
