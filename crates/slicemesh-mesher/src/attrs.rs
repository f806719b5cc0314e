//! Per-face attributes carried by the lit mesher.

use crate::constants::{MAX_LIGHT_LEVEL, OPAQUE_ALPHA};

/// 8-bit-per-channel tint.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rgba(pub [u8; 4]);

impl Rgba {
    pub const WHITE: Rgba = Rgba([255, 255, 255, OPAQUE_ALPHA]);

    #[inline]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Rgba([r, g, b, a])
    }

    #[inline]
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Rgba([r, g, b, OPAQUE_ALPHA])
    }

    #[inline]
    pub fn rgb(self) -> [u8; 3] {
        [self.0[0], self.0[1], self.0[2]]
    }
}

/// Sun level in the high nibble, torch level in the low nibble.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct PackedLight(pub u8);

impl PackedLight {
    pub const FULL_SUN: PackedLight = PackedLight(MAX_LIGHT_LEVEL << 4);

    #[inline]
    pub fn new(sun: u8, torch: u8) -> Self {
        debug_assert!(sun <= MAX_LIGHT_LEVEL, "sun level {sun} > {MAX_LIGHT_LEVEL}");
        debug_assert!(torch <= MAX_LIGHT_LEVEL, "torch level {torch} > {MAX_LIGHT_LEVEL}");
        PackedLight(((sun & 0x0F) << 4) | (torch & 0x0F))
    }

    #[inline]
    pub fn sun(self) -> u8 {
        self.0 >> 4
    }

    #[inline]
    pub fn torch(self) -> u8 {
        self.0 & 0x0F
    }

    #[inline]
    pub fn raw(self) -> u8 {
        self.0
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct FaceAttrs {
    pub color: Rgba,
    pub light: PackedLight,
    /// Texture-atlas tile.
    pub texture: u16,
}

impl FaceAttrs {
    #[inline]
    pub const fn new(color: Rgba, light: PackedLight, texture: u16) -> Self {
        Self {
            color,
            light,
            texture,
        }
    }
}

/// Decides whether two faces may share one merged quad.
pub trait MergeKey: Copy + Default {
    fn merges_with(&self, other: &Self) -> bool;
}

/// Geometry-only faces carry nothing and always merge.
impl MergeKey for () {
    #[inline]
    fn merges_with(&self, _other: &Self) -> bool {
        true
    }
}

impl MergeKey for FaceAttrs {
    /// Alpha is not compared.
    #[inline]
    fn merges_with(&self, other: &Self) -> bool {
        self.color.rgb() == other.color.rgb()
            && self.light == other.light
            && self.texture == other.texture
    }
}
