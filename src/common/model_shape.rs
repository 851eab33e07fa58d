/// Input height/width the model expects, as far as the detector knows it.
///
/// Starts as `Discovered` when the model declares static dims and `Unknown`
/// when they are dynamic. Moves to `Corrected` when the runtime reports the
/// size it actually wants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModelShape {
    #[default]
    Unknown,
    Discovered { height: u32, width: u32 },
    Corrected { height: u32, width: u32 },
}

impl ModelShape {
    /// Reads `[batch, channels, height, width]` as declared by the model.
    /// Dynamic (non-positive) or missing dims leave the shape unknown.
    pub fn from_declared(dims: &[i64]) -> Self {
        if dims.len() < 4 {
            return Self::Unknown;
        }
        match (u32::try_from(dims[2]), u32::try_from(dims[3])) {
            (Ok(height), Ok(width)) if height > 0 && width > 0 => Self::Discovered { height, width },
            _ => Self::Unknown,
        }
    }

    pub fn expected(&self) -> Option<(u32, u32)> {
        match *self {
            Self::Unknown => None,
            Self::Discovered { height, width } | Self::Corrected { height, width } => Some((height, width)),
        }
    }

    /// `(height, width)` to feed the model, `fallback` while unknown.
    pub fn resolve(&self, fallback: (u32, u32)) -> (u32, u32) {
        self.expected().unwrap_or(fallback)
    }

    pub fn is_known(&self) -> bool {
        self.expected().is_some()
    }

    pub fn corrected(height: u32, width: u32) -> Self {
        Self::Corrected { height, width }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_dims_are_discovered() {
        let shape = ModelShape::from_declared(&[1, 3, 640, 480]);
        assert_eq!(shape, ModelShape::Discovered { height: 640, width: 480 });
        assert_eq!(shape.resolve((320, 320)), (640, 480));
    }

    #[test]
    fn dynamic_dims_stay_unknown() {
        assert_eq!(ModelShape::from_declared(&[1, 3, -1, -1]), ModelShape::Unknown);
        assert_eq!(ModelShape::from_declared(&[1, 3, 0, 640]), ModelShape::Unknown);
        assert_eq!(ModelShape::from_declared(&[1, 3]), ModelShape::Unknown);
        assert_eq!(ModelShape::Unknown.resolve((320, 320)), (320, 320));
    }

    #[test]
    fn corrected_shape_wins_over_fallback() {
        let shape = ModelShape::corrected(416, 416);
        assert!(shape.is_known());
        assert_eq!(shape.resolve((320, 320)), (416, 416));
    }
}
