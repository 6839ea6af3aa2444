bitflags::bitflags! {
    /// Per-drawable shading switches, uploaded verbatim in the payload flag word.
    ///
    /// Bit positions are shared with the fragment shader; append, never renumber.
    #[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
    pub struct DrawableFlags: u32 {
        const USE_TEXTURE = 1 << 0;
        const USE_SECONDARY_TEXTURE = 1 << 1;
        const REPEAT_TEXTURE = 1 << 2;
        const REPEAT_SECONDARY_TEXTURE = 1 << 3;
        const FILTER_TEXTURE = 1 << 4;
        const FILTER_SECONDARY_TEXTURE = 1 << 5;
        /// Secondary texture is a soft alpha mask over the primary.
        const MASK_TEXTURE_MODE = 1 << 6;
        /// With `MASK_TEXTURE_MODE`, the mask also scales color channels.
        const MASK_TEXTURE_COLOR_CHANNELS = 1 << 7;
        /// Displacement is signed around 0.5.
        const SIGNED_DISPLACEMENT_MODE = 1 << 8;
        /// Sample the texture at its real size instead of stretching it.
        const PATTERN_MODE = 1 << 9;
        const SECONDARY_PATTERN_MODE = 1 << 10;
        /// See-through effect; only meaningful with `PATTERN_MODE`.
        const SEE_THROUGH_MODE = 1 << 11;
        const SECONDARY_SEE_THROUGH_MODE = 1 << 12;
        const FLIP_TEXTURE_X = 1 << 13;
        const FLIP_TEXTURE_Y = 1 << 14;
        const FLIP_SECONDARY_TEXTURE_X = 1 << 15;
        const FLIP_SECONDARY_TEXTURE_Y = 1 << 16;
        /// Add the secondary texture instead of alpha-blending it.
        const SECONDARY_TEXTURE_ADD_BLEND = 1 << 17;
    }
}

impl DrawableFlags {
    /// Bits `reset` keeps: which textures are bound is state, not a style choice.
    pub const TEXTURE_USE: Self = Self::USE_TEXTURE.union(Self::USE_SECONDARY_TEXTURE);

    /// Bits every fresh drawable starts with.
    pub const DEFAULT: Self = Self::REPEAT_TEXTURE.union(Self::REPEAT_SECONDARY_TEXTURE);

    /// Drops every style bit, keeps texture bindings, restores the defaults.
    #[inline]
    pub fn reset(self) -> Self {
        (self & Self::TEXTURE_USE) | Self::DEFAULT
    }
}

impl Default for DrawableFlags {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_keeps_texture_use_and_restores_repeat() {
        let f = DrawableFlags::USE_TEXTURE | DrawableFlags::FLIP_TEXTURE_X;
        assert_eq!(f.reset(), DrawableFlags::USE_TEXTURE | DrawableFlags::DEFAULT);
    }

    #[test]
    fn unknown_bits_are_rejected_at_the_boundary() {
        assert!(DrawableFlags::from_bits(1 << 31).is_none());
        assert_eq!(DrawableFlags::from_bits_truncate(0b101), DrawableFlags::USE_TEXTURE | DrawableFlags::REPEAT_TEXTURE);
    }
}
