const LUMA_R: f64 = 0.299;
const LUMA_G: f64 = 0.587;
const LUMA_B: f64 = 0.114;

/// D65 reference white, XYZ scaled by 100.
pub const D65_WHITE: Xyz = Xyz {
    x: 95.047,
    y: 100.0,
    z: 108.883,
};

/// Linear sRGB -> XYZ (D65) matrix, row-major.
const SRGB_TO_XYZ: [[f64; 3]; 3] = [
    [0.4124564, 0.3575761, 0.1804375],
    [0.2126729, 0.7151522, 0.0721750],
    [0.0193339, 0.1191920, 0.9503041],
];

const LAB_DELTA: f64 = 6.0 / 29.0;

/// Perceived brightness, `0.299r + 0.587g + 0.114b`. Not clamped.
#[inline]
pub fn luminance(r: u8, g: u8, b: u8) -> f64 {
    LUMA_R * r as f64 + LUMA_G * g as f64 + LUMA_B * b as f64
}

/// Saturating clamp into `[lo, hi]`.
#[inline]
pub fn clamp(value: f64, lo: f64, hi: f64) -> f64 {
    value.max(lo).min(hi)
}

/// Saturating clamp into the channel range `[0, 255]`.
#[inline]
pub fn clamp_channel(value: f64) -> f64 {
    clamp(value, 0.0, 255.0)
}

/// Convert a float to a stored channel sample: clamp to `[0, 255]`, then
/// round half to even. NaN stores as 0.
#[inline]
pub fn store(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    clamp_channel(value).round_ties_even() as u8
}

/// Round half up (`floor(x + 0.5)`), the rounding used inside formulas.
#[inline]
pub fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Strictly positive exponent for [`contrast_curve`]. Values above 1 raise
/// contrast, values below 1 flatten it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContrastFactor(f64);

impl ContrastFactor {
    /// The X-ray filter's factor.
    pub const XRAY: ContrastFactor = ContrastFactor(1.5);

    pub fn new(factor: f64) -> Result<Self, ColorError> {
        if factor.is_nan() || factor <= 0.0 {
            return Err(ColorError::InvalidContrast(factor));
        }
        Ok(Self(factor))
    }

    pub fn get(self) -> f64 {
        self.0
    }
}

/// S-shaped contrast curve over a 0-255 value. Above mid-gray the value is
/// raised to `1/factor`, at or below it to `factor`; the result is rescaled
/// and clamped but not rounded.
pub fn contrast_curve(value: f64, factor: ContrastFactor) -> f64 {
    let normalized = value / 255.0;
    let enhanced = if normalized > 0.5 {
        normalized.powf(1.0 / factor.0)
    } else {
        normalized.powf(factor.0)
    };
    clamp_channel(enhanced * 255.0)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsv {
    pub h: f64,
    pub s: f64,
    pub v: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Xyz {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lab {
    pub l: f64,
    pub a: f64,
    pub b: f64,
}

/// Hexagonal hue derivation: h in [0, 360), s and v in [0, 100].
/// Achromatic pixels get hue 0; black gets saturation 0.
pub fn rgb_to_hsv(r: u8, g: u8, b: u8) -> Hsv {
    let r = r as f64 / 255.0;
    let g = g as f64 / 255.0;
    let b = b as f64 / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let mut h = 0.0;
    if delta != 0.0 {
        h = if max == r {
            ((g - b) / delta) % 6.0
        } else if max == g {
            (b - r) / delta + 2.0
        } else {
            (r - g) / delta + 4.0
        };
        h *= 60.0;
    }
    if h < 0.0 {
        h += 360.0;
    }

    let s = if max == 0.0 { 0.0 } else { delta / max };

    Hsv {
        h,
        s: s * 100.0,
        v: max * 100.0,
    }
}

/// sRGB gamma decode of one normalized channel.
#[inline]
fn srgb_to_linear(c: f64) -> f64 {
    if c > 0.04045 {
        ((c + 0.055) / 1.055).powf(2.4)
    } else {
        c / 12.92
    }
}

/// sRGB -> XYZ (D65), scaled by 100.
pub fn rgb_to_xyz(r: u8, g: u8, b: u8) -> Xyz {
    let lin = [
        srgb_to_linear(r as f64 / 255.0),
        srgb_to_linear(g as f64 / 255.0),
        srgb_to_linear(b as f64 / 255.0),
    ];
    let row = |m: &[f64; 3]| (m[0] * lin[0] + m[1] * lin[1] + m[2] * lin[2]) * 100.0;
    Xyz {
        x: row(&SRGB_TO_XYZ[0]),
        y: row(&SRGB_TO_XYZ[1]),
        z: row(&SRGB_TO_XYZ[2]),
    }
}

#[inline]
fn lab_f(t: f64) -> f64 {
    let threshold = LAB_DELTA * LAB_DELTA * LAB_DELTA;
    if t > threshold {
        t.cbrt()
    } else {
        t / (3.0 * LAB_DELTA * LAB_DELTA) + 4.0 / 29.0
    }
}

/// XYZ (scaled by 100) -> CIE Lab relative to the D65 white.
pub fn xyz_to_lab(x: f64, y: f64, z: f64) -> Lab {
    let fx = lab_f(x / D65_WHITE.x);
    let fy = lab_f(y / D65_WHITE.y);
    let fz = lab_f(z / D65_WHITE.z);

    Lab {
        l: 116.0 * fy - 16.0,
        a: 500.0 * (fx - fy),
        b: 200.0 * (fy - fz),
    }
}

pub fn rgb_to_lab(r: u8, g: u8, b: u8) -> Lab {
    let xyz = rgb_to_xyz(r, g, b);
    xyz_to_lab(xyz.x, xyz.y, xyz.z)
}

#[derive(Debug, thiserror::Error)]
pub enum ColorError {
    #[error("contrast factor must be > 0, got {0}")]
    InvalidContrast(f64),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64, eps: f64) -> bool {
        (a - b).abs() <= eps
    }

    #[test]
    fn luminance_weights() {
        assert_eq!(luminance(0, 0, 0), 0.0);
        assert!(close(luminance(255, 255, 255), 255.0, 1e-9));
        assert!(close(luminance(100, 0, 0), 29.9, 1e-9));
        assert!(close(luminance(0, 100, 0), 58.7, 1e-9));
        assert!(close(luminance(0, 0, 100), 11.4, 1e-9));
    }

    #[test]
    fn store_clamps_then_rounds_half_even() {
        assert_eq!(store(-3.0), 0);
        assert_eq!(store(300.0), 255);
        assert_eq!(store(f64::NAN), 0);
        assert_eq!(store(2.5), 2);
        assert_eq!(store(3.5), 4);
        assert_eq!(store(254.6), 255);
        assert_eq!(round_half_up(2.5), 3.0);
        assert_eq!(round_half_up(2.49), 2.0);
    }

    #[test]
    fn hsv_reference_triples() {
        assert_eq!(
            rgb_to_hsv(255, 0, 0),
            Hsv {
                h: 0.0,
                s: 100.0,
                v: 100.0
            }
        );
        assert_eq!(
            rgb_to_hsv(0, 0, 0),
            Hsv {
                h: 0.0,
                s: 0.0,
                v: 0.0
            }
        );
        assert_eq!(
            rgb_to_hsv(255, 255, 255),
            Hsv {
                h: 0.0,
                s: 0.0,
                v: 100.0
            }
        );
    }

    #[test]
    fn hsv_hue_sectors() {
        assert!(close(rgb_to_hsv(0, 255, 0).h, 120.0, 1e-9));
        assert!(close(rgb_to_hsv(0, 0, 255).h, 240.0, 1e-9));
        // Negative intermediate hue wraps into [0, 360).
        assert!(close(rgb_to_hsv(255, 0, 255).h, 300.0, 1e-9));
        let hsv = rgb_to_hsv(128, 64, 64);
        assert!(close(hsv.h, 0.0, 1e-9));
        assert!(close(hsv.s, 50.0, 1e-9));
    }

    #[test]
    fn xyz_of_white_is_d65() {
        let xyz = rgb_to_xyz(255, 255, 255);
        assert!(close(xyz.x, 95.047, 1e-3));
        assert!(close(xyz.y, 100.0, 1e-3));
        assert!(close(xyz.z, 108.883, 1e-3));
    }

    #[test]
    fn gamma_decode_uses_linear_segment_for_dark_values() {
        // 10/255 = 0.0392 is below the 0.04045 knee: linear / 12.92.
        let xyz = rgb_to_xyz(10, 10, 10);
        let lin = (10.0 / 255.0) / 12.92;
        assert!(close(xyz.y, lin * 100.0 * 1.0000001, 1e-9));
    }

    #[test]
    fn lab_of_d65_white_is_neutral() {
        let lab = xyz_to_lab(95.047, 100.0, 108.883);
        assert!(close(lab.l, 100.0, 1e-9));
        assert!(close(lab.a, 0.0, 1e-9));
        assert!(close(lab.b, 0.0, 1e-9));
    }

    #[test]
    fn lab_of_black_uses_linear_branch() {
        let lab = rgb_to_lab(0, 0, 0);
        assert!(close(lab.l, 0.0, 1e-9));
        assert!(close(lab.a, 0.0, 1e-9));
        assert!(close(lab.b, 0.0, 1e-9));
    }

    #[test]
    fn lab_of_red_is_reddish() {
        let lab = rgb_to_lab(255, 0, 0);
        assert!(close(lab.l, 53.24, 0.05));
        assert!(close(lab.a, 80.09, 0.05));
        assert!(close(lab.b, 67.20, 0.05));
    }

    #[test]
    fn contrast_curve_shape() {
        let factor = ContrastFactor::new(1.5).unwrap();
        assert_eq!(contrast_curve(0.0, factor), 0.0);
        assert!(close(contrast_curve(255.0, factor), 255.0, 1e-9));
        // Exactly mid-gray takes the lower branch.
        let mid = contrast_curve(127.5, factor);
        assert!(close(mid, 0.5f64.powf(1.5) * 255.0, 1e-9));
        // Brighter values are pushed up, darker values down.
        assert!(contrast_curve(200.0, factor) > 200.0);
        assert!(contrast_curve(60.0, factor) < 60.0);
    }

    #[test]
    fn contrast_factor_must_be_positive() {
        assert!(ContrastFactor::new(0.0).is_err());
        assert!(ContrastFactor::new(-1.0).is_err());
        assert!(ContrastFactor::new(f64::NAN).is_err());
        assert_eq!(ContrastFactor::new(2.0).unwrap().get(), 2.0);
    }
}
