// Gamma-correct coverage blending for anti-aliased ink.
// Visual: Wu's partial-coverage pixels fade smoothly into the background
// instead of looking too dark (which plain sRGB mixing does).

use crate::types::Color;
use std::sync::LazyLock;

static LUT: LazyLock<GammaLut> = LazyLock::new(GammaLut::new);

/// Shared tables, built on first use.
pub fn lut() -> &'static GammaLut {
    &LUT
}

pub struct GammaLut {
    // sRGB(0..255) -> linear (0..1) as f32
    srgb_to_linear: [f32; 256],
    // linear(0..1) -> sRGB(0..255) via 4096-step quantization
    // (index = (linear * 4095).round())
    linear_to_srgb: [u8; 4096],
}

impl GammaLut {
    pub fn new() -> Self {
        let mut s2l = [0.0f32; 256];
        for (v, slot) in s2l.iter_mut().enumerate() {
            let c = v as f32 / 255.0;
            *slot = if c <= 0.04045 { c / 12.92 } else { ((c + 0.055) / 1.055).powf(2.4) };
        }

        let mut l2s = [0u8; 4096];
        for (i, slot) in l2s.iter_mut().enumerate() {
            let l = i as f32 / 4095.0;
            let s = if l <= 0.003_130_8 { 12.92 * l } else { 1.055 * l.powf(1.0 / 2.4) - 0.055 };
            *slot = (s * 255.0).round().clamp(0.0, 255.0) as u8;
        }

        Self { srgb_to_linear: s2l, linear_to_srgb: l2s }
    }

    #[inline]
    pub fn srgb_u8_to_linear(&self, v: u8) -> f32 {
        self.srgb_to_linear[v as usize]
    }

    #[inline]
    pub fn linear_to_srgb_u8(&self, l: f32) -> u8 {
        let idx = (l.clamp(0.0, 1.0) * 4095.0).round() as usize;
        self.linear_to_srgb[idx]
    }

    /// Mix `color` over the packed 0x00RRGGBB pixel `dst`.
    /// Effective alpha is `color.a * coverage`; full alpha replaces the pixel.
    pub fn blend(&self, dst: u32, color: Color, coverage: f32) -> u32 {
        let alpha = (color.a as f32 / 255.0) * coverage.clamp(0.0, 1.0);
        if alpha <= 0.0 {
            return dst;
        }
        if alpha >= 1.0 {
            return color.to_u32();
        }

        let mix = |d: u8, s: u8| -> u32 {
            let dl = self.srgb_u8_to_linear(d);
            let sl = self.srgb_u8_to_linear(s);
            self.linear_to_srgb_u8(dl + (sl - dl) * alpha) as u32
        };

        let r = mix(((dst >> 16) & 0xFF) as u8, color.r);
        let g = mix(((dst >> 8) & 0xFF) as u8, color.g);
        let b = mix((dst & 0xFF) as u8, color.b);
        (r << 16) | (g << 8) | b
    }
}

impl Default for GammaLut {
    fn default() -> Self {
        Self::new()
    }
}
