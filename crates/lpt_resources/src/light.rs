use glam::Vec3;

use lpt_core::{DirtyFlags, Entity, EntityBase, LptError};

use crate::uniforms::LightData;

#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LightType {
    #[default]
    Directional = 0,
    Spot = 1,
    Point = 2,
    ReversePoint = 3,
}

impl TryFrom<u32> for LightType {
    type Error = LptError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Directional),
            1 => Ok(Self::Spot),
            2 => Ok(Self::Point),
            3 => Ok(Self::ReversePoint),
            other => Err(LptError::UnknownLightType(other)),
        }
    }
}

/// Scene light. Every setter raises [`DirtyFlags::LIGHT`].
#[derive(Debug, Clone)]
pub struct Light {
    base: EntityBase,
    data: LightData,
}

impl Default for Light {
    fn default() -> Self {
        Self::new()
    }
}

impl Light {
    #[must_use]
    pub fn new() -> Self {
        Self {
            base: EntityBase::new(Self::INITIAL_DIRTY),
            data: LightData::default(),
        }
    }

    #[inline]
    #[must_use]
    pub fn data(&self) -> &LightData {
        &self.data
    }

    #[must_use]
    pub fn light_type(&self) -> LightType {
        // The record is only ever written through `set_type`.
        LightType::try_from(self.data.light_type).unwrap_or_default()
    }

    pub fn set_type(&mut self, light_type: LightType) {
        self.data.light_type = light_type as u32;
        self.mark_dirty(DirtyFlags::LIGHT);
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.data.position = position;
        self.mark_dirty(DirtyFlags::LIGHT);
    }

    /// Stored normalized; a zero vector is stored as-is.
    pub fn set_direction(&mut self, direction: Vec3) {
        self.data.direction = direction.normalize_or_zero();
        self.mark_dirty(DirtyFlags::LIGHT);
    }

    pub fn set_range(&mut self, range: f32) {
        self.data.range = range;
        self.mark_dirty(DirtyFlags::LIGHT);
    }

    /// Full cone angle in radians.
    pub fn set_spot_angle(&mut self, angle: f32) {
        self.data.spot_angle = angle;
        self.mark_dirty(DirtyFlags::LIGHT);
    }

    pub fn set_color(&mut self, color: Vec3) {
        self.data.color = color;
        self.mark_dirty(DirtyFlags::LIGHT);
    }
}

impl Entity for Light {
    const INITIAL_DIRTY: DirtyFlags = DirtyFlags::LIGHT;

    fn base(&self) -> &EntityBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut EntityBase {
        &mut self.base
    }
}
