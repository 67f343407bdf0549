use palette::{LinSrgb, Mix, Srgb};
use plotters::style::RGBColor;

// ---------------------------------------------------------------------------
// Continuous colour maps
// ---------------------------------------------------------------------------

/// Sequential colour map defined by evenly spaced sRGB stops and interpolated
/// in linear light.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorMap {
    pub name: &'static str,
    stops: &'static [Srgb<u8>],
    reversed: bool,
}

const fn rgb(r: u8, g: u8, b: u8) -> Srgb<u8> {
    Srgb::new(r, g, b)
}

const BLUES: &[Srgb<u8>] = &[
    rgb(0xf7, 0xfb, 0xff),
    rgb(0xde, 0xeb, 0xf7),
    rgb(0xc6, 0xdb, 0xef),
    rgb(0x9e, 0xca, 0xe1),
    rgb(0x6b, 0xae, 0xd6),
    rgb(0x42, 0x92, 0xc6),
    rgb(0x21, 0x71, 0xb5),
    rgb(0x08, 0x51, 0x9c),
    rgb(0x08, 0x30, 0x6b),
];

const GREENS: &[Srgb<u8>] = &[
    rgb(0xf7, 0xfc, 0xf5),
    rgb(0xe5, 0xf5, 0xe0),
    rgb(0xc7, 0xe9, 0xc0),
    rgb(0xa1, 0xd9, 0x9b),
    rgb(0x74, 0xc4, 0x76),
    rgb(0x41, 0xab, 0x5d),
    rgb(0x23, 0x8b, 0x45),
    rgb(0x00, 0x6d, 0x2c),
    rgb(0x00, 0x44, 0x1b),
];

const REDS: &[Srgb<u8>] = &[
    rgb(0xff, 0xf5, 0xf0),
    rgb(0xfe, 0xe0, 0xd2),
    rgb(0xfc, 0xbb, 0xa1),
    rgb(0xfc, 0x92, 0x72),
    rgb(0xfb, 0x6a, 0x4a),
    rgb(0xef, 0x3b, 0x2c),
    rgb(0xcb, 0x18, 0x1d),
    rgb(0xa5, 0x0f, 0x15),
    rgb(0x67, 0x00, 0x0d),
];

const PURPLES: &[Srgb<u8>] = &[
    rgb(0xfc, 0xfb, 0xfd),
    rgb(0xef, 0xed, 0xf5),
    rgb(0xda, 0xda, 0xeb),
    rgb(0xbc, 0xbd, 0xdc),
    rgb(0x9e, 0x9a, 0xc8),
    rgb(0x80, 0x7d, 0xba),
    rgb(0x6a, 0x51, 0xa3),
    rgb(0x54, 0x27, 0x8f),
    rgb(0x3f, 0x00, 0x7d),
];

const VIRIDIS: &[Srgb<u8>] = &[
    rgb(0x44, 0x01, 0x54),
    rgb(0x47, 0x2c, 0x7a),
    rgb(0x3b, 0x52, 0x8b),
    rgb(0x2c, 0x72, 0x8e),
    rgb(0x21, 0x91, 0x8c),
    rgb(0x27, 0xad, 0x81),
    rgb(0x5c, 0xc8, 0x63),
    rgb(0xaa, 0xdc, 0x32),
    rgb(0xfd, 0xe7, 0x25),
];

const PLASMA: &[Srgb<u8>] = &[
    rgb(0x0d, 0x08, 0x87),
    rgb(0x4c, 0x02, 0xa1),
    rgb(0x7e, 0x03, 0xa8),
    rgb(0xa9, 0x23, 0x95),
    rgb(0xcc, 0x47, 0x78),
    rgb(0xe5, 0x6b, 0x5d),
    rgb(0xf8, 0x94, 0x41),
    rgb(0xfd, 0xc3, 0x28),
    rgb(0xf0, 0xf9, 0x21),
];

const INFERNO: &[Srgb<u8>] = &[
    rgb(0x00, 0x00, 0x04),
    rgb(0x1f, 0x0c, 0x48),
    rgb(0x55, 0x0f, 0x6d),
    rgb(0x88, 0x22, 0x6a),
    rgb(0xba, 0x36, 0x55),
    rgb(0xe3, 0x59, 0x33),
    rgb(0xf9, 0x8e, 0x09),
    rgb(0xf9, 0xcb, 0x35),
    rgb(0xfc, 0xff, 0xa4),
];

impl ColorMap {
    pub const BLUES: ColorMap = ColorMap::new("Blues", BLUES);
    pub const GREENS: ColorMap = ColorMap::new("Greens", GREENS);
    pub const REDS: ColorMap = ColorMap::new("Reds", REDS);
    pub const PURPLES: ColorMap = ColorMap::new("Purples", PURPLES);
    pub const VIRIDIS: ColorMap = ColorMap::new("viridis", VIRIDIS);
    pub const PLASMA_R: ColorMap = ColorMap::new("plasma_r", PLASMA).reverse();
    pub const INFERNO_R: ColorMap = ColorMap::new("inferno_r", INFERNO).reverse();

    const fn new(name: &'static str, stops: &'static [Srgb<u8>]) -> Self {
        ColorMap {
            name,
            stops,
            reversed: false,
        }
    }

    const fn reverse(self) -> Self {
        ColorMap {
            reversed: !self.reversed,
            ..self
        }
    }

    /// Colour at position `t` in `[0, 1]`; out-of-range values are clamped.
    pub fn at(&self, t: f64) -> RGBColor {
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        let t = if self.reversed { 1.0 - t } else { t };
        let scaled = t * (self.stops.len() - 1) as f64;
        let i = (scaled.floor() as usize).min(self.stops.len() - 2);
        let frac = (scaled - i as f64) as f32;
        let a: LinSrgb<f32> = self.stops[i].into_linear();
        let b: LinSrgb<f32> = self.stops[i + 1].into_linear();
        let mixed = Srgb::<u8>::from_linear(a.mix(b, frac));
        RGBColor(mixed.red, mixed.green, mixed.blue)
    }

    /// Named colour used for titles drawn in this map's hue: `"Blue"` for
    /// `Blues`, and so on.
    pub fn title_color(&self) -> RGBColor {
        match self.name {
            "Blues" => BLUE,
            "Greens" => GREEN,
            "Reds" => RED,
            "Purples" => PURPLE,
            _ => BLACK,
        }
    }
}

/// Logarithmic normalisation of `value` into `[0, 1]` over `[lo, hi]`.
pub fn log_norm(value: f64, lo: f64, hi: f64) -> f64 {
    if lo <= 0.0 || hi <= lo || value <= 0.0 {
        return 0.0;
    }
    ((value.ln() - lo.ln()) / (hi.ln() - lo.ln())).clamp(0.0, 1.0)
}

// ---------------------------------------------------------------------------
// Named colours
// ---------------------------------------------------------------------------

pub const BLACK: RGBColor = RGBColor(0, 0, 0);
pub const WHITE: RGBColor = RGBColor(255, 255, 255);
pub const BLUE: RGBColor = RGBColor(0, 0, 255);
pub const GREEN: RGBColor = RGBColor(0, 128, 0);
pub const RED: RGBColor = RGBColor(255, 0, 0);
pub const PURPLE: RGBColor = RGBColor(128, 0, 128);
pub const GREY: RGBColor = RGBColor(128, 128, 128);
/// Dark grey used for annotation text.
pub const DARK_GREY: RGBColor = RGBColor(77, 77, 77);
pub const SILVER: RGBColor = RGBColor(192, 192, 192);
pub const LIGHT_GREY: RGBColor = RGBColor(211, 211, 211);

/// Default categorical cycle for series without an assigned colour.
pub const CYCLE: [RGBColor; 4] = [
    RGBColor(0x1f, 0x77, 0xb4),
    RGBColor(0xff, 0x7f, 0x0e),
    RGBColor(0x2c, 0xa0, 0x2c),
    RGBColor(0xd6, 0x27, 0x28),
];

/// Colour identifying each dating method across figures.
pub fn method_color(method: &str) -> RGBColor {
    match method {
        "tsdate" => RGBColor(0x1f, 0x77, 0xb4),
        "relate" => RGBColor(0x2c, 0xa0, 0x2c),
        "geva" => RGBColor(0xd6, 0x27, 0x28),
        _ => GREY,
    }
}

/// Colour of a geographic region (see `data::regions`).
pub fn region_color(region: &str) -> RGBColor {
    match region {
        "East Asia" => RGBColor(0x37, 0xa0, 0x55),
        "West Eurasia" | "Europe" => RGBColor(0x6b, 0xae, 0xd6),
        "Africa" => RGBColor(0xff, 0xe8, 0x1a),
        "Americas" => RGBColor(0xe3, 0x2f, 0x27),
        "South Asia" | "Central/South Asia" => RGBColor(0x79, 0x6e, 0xb2),
        "Middle East" => RGBColor(0x00, 0x80, 0x80),
        "Oceania" => RGBColor(0x8b, 0x45, 0x13),
        "Central Asia/Siberia" => RGBColor(0xff, 0xc0, 0xcb),
        "Ancients" => RGBColor(0xff, 0xa5, 0x00),
        _ => GREY,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_hit_first_and_last_stop() {
        assert_eq!(ColorMap::BLUES.at(0.0), RGBColor(0xf7, 0xfb, 0xff));
        assert_eq!(ColorMap::BLUES.at(1.0), RGBColor(0x08, 0x30, 0x6b));
        assert_eq!(ColorMap::VIRIDIS.at(2.0), ColorMap::VIRIDIS.at(1.0));
    }

    #[test]
    fn reversed_map_flips_direction() {
        assert_eq!(ColorMap::INFERNO_R.at(0.0), RGBColor(0xfc, 0xff, 0xa4));
        assert_eq!(ColorMap::PLASMA_R.at(1.0), RGBColor(0x0d, 0x08, 0x87));
    }

    #[test]
    fn title_colour_follows_hue() {
        assert_eq!(ColorMap::GREENS.title_color(), GREEN);
        assert_eq!(ColorMap::VIRIDIS.title_color(), BLACK);
    }

    #[test]
    fn log_norm_is_clamped() {
        assert!((log_norm(10.0, 1.0, 100.0) - 0.5).abs() < 1e-12);
        assert_eq!(log_norm(1000.0, 1.0, 100.0), 1.0);
        assert_eq!(log_norm(0.0, 1.0, 100.0), 0.0);
    }
}
