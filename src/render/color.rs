use crate::error::PlayerError;

/// 8-bit RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const BLACK: Rgba = Rgba::opaque(0, 0, 0);
    pub const WHITE: Rgba = Rgba::opaque(255, 255, 255);

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }
}

/// Parse a color name or `#rrggbb` hex string.
pub fn parse_color(name: &str) -> Result<Rgba, PlayerError> {
    let named = match name {
        "black" => Some(Rgba::opaque(0, 0, 0)),
        "white" => Some(Rgba::opaque(255, 255, 255)),
        "red" => Some(Rgba::opaque(255, 0, 0)),
        "green" => Some(Rgba::opaque(0, 128, 0)),
        "lime" => Some(Rgba::opaque(0, 255, 0)),
        "blue" => Some(Rgba::opaque(0, 0, 255)),
        "cyan" => Some(Rgba::opaque(0, 255, 255)),
        "magenta" => Some(Rgba::opaque(255, 0, 255)),
        "yellow" => Some(Rgba::opaque(255, 255, 0)),
        "orange" => Some(Rgba::opaque(255, 165, 0)),
        "purple" => Some(Rgba::opaque(128, 0, 128)),
        _ => None,
    };
    if let Some(c) = named {
        return Ok(c);
    }

    let hex = name.strip_prefix('#').unwrap_or(name);
    if hex.len() == 6 {
        if let (Ok(r), Ok(g), Ok(b)) = (
            u8::from_str_radix(&hex[0..2], 16),
            u8::from_str_radix(&hex[2..4], 16),
            u8::from_str_radix(&hex[4..6], 16),
        ) {
            return Ok(Rgba::opaque(r, g, b));
        }
    }

    Err(PlayerError::Configuration(format!(
        "unknown color '{}'",
        name
    )))
}

/// Maps a numeric value to a color by piecewise-linear interpolation across
/// an ordered list of anchor colors over a closed domain. Values outside the
/// domain clamp to the boundary anchors.
pub struct ColorScale {
    anchors: Vec<Rgba>,
    domain_min: f32,
    domain_max: f32,
}

impl ColorScale {
    pub fn new(anchors: Vec<Rgba>, domain_min: f32, domain_max: f32) -> Result<Self, PlayerError> {
        if anchors.is_empty() {
            return Err(PlayerError::Configuration(
                "color scale needs at least one anchor".into(),
            ));
        }
        if !(domain_min < domain_max) {
            return Err(PlayerError::Configuration(format!(
                "invalid color scale domain [{}, {}]",
                domain_min, domain_max
            )));
        }
        Ok(Self {
            anchors,
            domain_min,
            domain_max,
        })
    }

    /// Build a scale from color names (the playlist config format).
    pub fn from_names(names: &[String], domain_min: f32, domain_max: f32) -> Result<Self, PlayerError> {
        let anchors = names
            .iter()
            .map(|n| parse_color(n))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(anchors, domain_min, domain_max)
    }

    pub fn color(&self, value: f32) -> Rgba {
        if self.anchors.len() == 1 {
            return self.anchors[0];
        }

        let t = (value - self.domain_min) / (self.domain_max - self.domain_min);
        let t = t.clamp(0.0, 1.0);

        // Position along the anchor sequence.
        let scaled = t * (self.anchors.len() - 1) as f32;
        let idx = (scaled.floor() as usize).min(self.anchors.len() - 2);
        let frac = scaled - idx as f32;

        let a = self.anchors[idx];
        let b = self.anchors[idx + 1];
        let lerp = |x: u8, y: u8| -> u8 { (x as f32 + (y as f32 - x as f32) * frac).round() as u8 };

        Rgba {
            r: lerp(a.r, b.r),
            g: lerp(a.g, b.g),
            b: lerp(a.b, b.b),
            a: 255,
        }
    }
}
