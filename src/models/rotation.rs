use std::fmt;
use std::str::FromStr;

/// Right-angle rotations (clockwise) tried by the rotation retry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rotation {
    /// 90 degrees clockwise
    Deg90,
    /// 180 degrees
    Deg180,
    /// 270 degrees clockwise
    Deg270,
}

impl Rotation {
    /// Angle in degrees
    pub fn degrees(&self) -> u16 {
        match self {
            Rotation::Deg90 => 90,
            Rotation::Deg180 => 180,
            Rotation::Deg270 => 270,
        }
    }

    /// Rotation for an angle in degrees, if supported
    pub fn from_degrees(degrees: u16) -> Option<Self> {
        match degrees % 360 {
            90 => Some(Rotation::Deg90),
            180 => Some(Rotation::Deg180),
            270 => Some(Rotation::Deg270),
            _ => None,
        }
    }
}

impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}°", self.degrees())
    }
}

impl FromStr for Rotation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_end_matches('°');
        trimmed
            .parse::<u16>()
            .ok()
            .and_then(Rotation::from_degrees)
            .ok_or_else(|| format!("unsupported rotation: {s}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!("90".parse::<Rotation>(), Ok(Rotation::Deg90));
        assert_eq!(" 180° ".parse::<Rotation>(), Ok(Rotation::Deg180));
        assert_eq!("450".parse::<Rotation>(), Ok(Rotation::Deg90));
        assert!("15".parse::<Rotation>().is_err());
        assert!("0".parse::<Rotation>().is_err());
    }
}
