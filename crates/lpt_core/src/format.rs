use crate::errors::LptError;

/// Pixel formats understood by textures and render targets.
#[repr(u32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum TextureFormat {
    #[default]
    Unknown = 0,
    Ru8,
    RGu8,
    RGBAu8,
    Rf16,
    RGf16,
    RGBAf16,
    Rf32,
    RGf32,
    RGBAf32,
}

impl TextureFormat {
    /// Size of a single texel in bytes. `Unknown` has no size.
    #[must_use]
    pub const fn texel_size(self) -> usize {
        match self {
            Self::Unknown => 0,
            Self::Ru8 => 1,
            Self::RGu8 | Self::Rf16 => 2,
            Self::RGBAu8 | Self::RGf16 | Self::Rf32 => 4,
            Self::RGBAf16 | Self::RGf32 => 8,
            Self::RGBAf32 => 16,
        }
    }

    /// Byte size of a tightly packed `width * height` image in this format.
    #[must_use]
    pub const fn image_size(self, width: u32, height: u32) -> usize {
        self.texel_size() * width as usize * height as usize
    }
}

/// Lookup used by the backend for buffer sizing.
#[inline]
#[must_use]
pub const fn texel_size(format: TextureFormat) -> usize {
    format.texel_size()
}

impl TryFrom<u32> for TextureFormat {
    type Error = LptError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => Self::Unknown,
            1 => Self::Ru8,
            2 => Self::RGu8,
            3 => Self::RGBAu8,
            4 => Self::Rf16,
            5 => Self::RGf16,
            6 => Self::RGBAf16,
            7 => Self::Rf32,
            8 => Self::RGf32,
            9 => Self::RGBAf32,
            other => return Err(LptError::UnknownTextureFormat(other)),
        })
    }
}
