use image::{DynamicImage, GrayImage, RgbImage, RgbaImage};

/// Source frame handed to the detector. Detections come back in its pixel space.
#[derive(Debug, Clone, Default)]
pub struct ArdImage {
    pub image: RgbImage,
}

impl std::ops::Deref for ArdImage {
    type Target = RgbImage;

    fn deref(&self) -> &Self::Target {
        &self.image
    }
}

impl From<DynamicImage> for ArdImage {
    fn from(image: DynamicImage) -> Self {
        Self {
            image: image.to_rgb8(),
        }
    }
}

impl From<GrayImage> for ArdImage {
    fn from(image: GrayImage) -> Self {
        Self {
            image: DynamicImage::from(image).to_rgb8(),
        }
    }
}

impl From<RgbImage> for ArdImage {
    fn from(image: RgbImage) -> Self {
        Self { image }
    }
}

impl From<RgbaImage> for ArdImage {
    fn from(image: RgbaImage) -> Self {
        Self {
            image: DynamicImage::from(image).to_rgb8(),
        }
    }
}

impl From<ArdImage> for RgbImage {
    fn from(image: ArdImage) -> Self {
        image.image
    }
}

impl ArdImage {
    pub fn new(image: RgbImage) -> Self {
        Self { image }
    }

    /// Wraps a tightly packed RGB8 buffer. Returns `None` when the buffer is too short.
    pub fn from_raw_rgb(width: u32, height: u32, buffer: Vec<u8>) -> Option<Self> {
        RgbImage::from_raw(width, height, buffer).map(Self::new)
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn is_empty(&self) -> bool {
        self.image.width() == 0 || self.image.height() == 0
    }

    /// RGB triple at `(x, y)`, `None` outside the frame.
    pub fn rgb_at(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        self.image.get_pixel_checked(x, y).map(|p| p.0)
    }

    pub fn as_raw(&self) -> &[u8] {
        self.image.as_raw()
    }
}
