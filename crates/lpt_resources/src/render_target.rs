use lpt_core::{DirtyFlags, Entity, EntityBase, TextureFormat};

/// Output image description. Pixel storage belongs to the backend.
#[derive(Debug, Clone)]
pub struct RenderTarget {
    base: EntityBase,
    format: TextureFormat,
    width: u32,
    height: u32,
    readback_enabled: bool,
}

impl RenderTarget {
    #[must_use]
    pub fn new(format: TextureFormat, width: u32, height: u32) -> Self {
        Self {
            base: EntityBase::new(Self::INITIAL_DIRTY),
            format,
            width,
            height,
            readback_enabled: false,
        }
    }

    #[must_use]
    pub fn format(&self) -> TextureFormat {
        self.format
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Width over height, `1.0` for an empty target.
    #[must_use]
    pub fn aspect(&self) -> f32 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }

    #[must_use]
    pub fn is_readback_enabled(&self) -> bool {
        self.readback_enabled
    }

    /// Toggles CPU readback of rendered pixels.
    pub fn enable_readback(&mut self, enabled: bool) {
        self.readback_enabled = enabled;
        self.mark_dirty(DirtyFlags::RENDER_TARGET);
    }
}

impl Entity for RenderTarget {
    const INITIAL_DIRTY: DirtyFlags = DirtyFlags::RENDER_TARGET;

    fn base(&self) -> &EntityBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut EntityBase {
        &mut self.base
    }
}
