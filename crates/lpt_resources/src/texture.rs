use lpt_core::{DirtyFlags, Entity, EntityBase, LptError, Result, TextureFormat};

/// CPU-side texture: format, size and a tightly packed pixel copy.
#[derive(Debug, Clone)]
pub struct Texture {
    base: EntityBase,
    format: TextureFormat,
    width: u32,
    height: u32,
    data: Vec<u8>,
    /// GPU slot assigned by the backend.
    index: u32,
}

impl Texture {
    /// Allocates zeroed pixel storage for `width * height` texels.
    #[must_use]
    pub fn new(format: TextureFormat, width: u32, height: u32) -> Self {
        Self {
            base: EntityBase::new(Self::INITIAL_DIRTY),
            format,
            width,
            height,
            data: vec![0; format.image_size(width, height)],
            index: 0,
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

    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Byte size implied by format and dimensions.
    #[must_use]
    pub fn byte_size(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Backend bookkeeping; does not mark the texture dirty.
    pub fn set_index(&mut self, index: u32) {
        self.index = index;
    }

    /// Copies `src` into the pixel storage and raises [`DirtyFlags::TEXTURE_DATA`].
    ///
    /// `src` is expected to hold exactly [`byte_size`](Self::byte_size) bytes.
    /// A size mismatch is a caller error: the overlapping prefix is copied and
    /// a warning is logged. Use [`try_upload`](Self::try_upload) to reject it.
    pub fn upload(&mut self, src: &[u8]) {
        let expected = self.data.len();
        if src.len() != expected {
            log::warn!(
                "Texture '{}': upload of {} bytes, expected {expected}",
                self.name(),
                src.len()
            );
        }
        let n = expected.min(src.len());
        self.data[..n].copy_from_slice(&src[..n]);
        self.mark_dirty(DirtyFlags::TEXTURE_DATA);
    }

    pub fn try_upload(&mut self, src: &[u8]) -> Result<()> {
        if src.len() != self.data.len() {
            return Err(LptError::TextureSizeMismatch {
                expected: self.data.len(),
                actual: src.len(),
            });
        }
        self.upload(src);
        Ok(())
    }
}

impl Entity for Texture {
    const INITIAL_DIRTY: DirtyFlags = DirtyFlags::TEXTURE.union(DirtyFlags::TEXTURE_DATA);

    fn base(&self) -> &EntityBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut EntityBase {
        &mut self.base
    }
}
