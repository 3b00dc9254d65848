// ============================================================================
// Échelle de couleurs : variation du jour -> couleur
// ============================================================================
// Interpolation linéaire RGB par morceaux :
// rouge foncé (-15%) -> gris foncé (0%) -> vert foncé (+15%)
// Hors domaine : couleur de l'extrémité la plus proche
// ============================================================================

use ratatui::style::Color;

/// Couleur RGB 8 bits par canal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Construit depuis un entier 0xRRGGBB
    pub const fn hex(value: u32) -> Self {
        Self((value >> 16) as u8, (value >> 8) as u8, value as u8)
    }

    fn lerp(self, other: Rgb, t: f64) -> Rgb {
        let channel = |a: u8, b: u8| -> u8 {
            let v = a as f64 + (b as f64 - a as f64) * t;
            v.round().clamp(0.0, 255.0) as u8
        };
        Rgb(
            channel(self.0, other.0),
            channel(self.1, other.1),
            channel(self.2, other.2),
        )
    }
}

impl From<Rgb> for Color {
    fn from(rgb: Rgb) -> Self {
        Color::Rgb(rgb.0, rgb.1, rgb.2)
    }
}

/// Points d'arrêt (% de variation)
pub const BREAKPOINTS: [f64; 11] = [-15.0, -10.0, -7.5, -5.0, -2.5, 0.0, 2.5, 5.0, 7.5, 10.0, 15.0];

/// Couleur associée à chaque point d'arrêt
pub const PALETTE: [Rgb; 11] = [
    Rgb::hex(0xb71c1c),
    Rgb::hex(0xc62828),
    Rgb::hex(0xd32f2f),
    Rgb::hex(0xe53935),
    Rgb::hex(0xef5350),
    Rgb::hex(0x424242),
    Rgb::hex(0x66bb6a),
    Rgb::hex(0x43a047),
    Rgb::hex(0x2e7d32),
    Rgb::hex(0x1b5e20),
    Rgb::hex(0x0d4710),
];

/// Couleur d'une case selon sa variation
pub fn color_for(percent_change: f64) -> Rgb {
    if percent_change.is_nan() {
        return PALETTE[5];
    }
    if percent_change <= BREAKPOINTS[0] {
        return PALETTE[0];
    }
    let last = BREAKPOINTS.len() - 1;
    if percent_change >= BREAKPOINTS[last] {
        return PALETTE[last];
    }

    // Segment [i, i+1] contenant la valeur
    let i = BREAKPOINTS
        .windows(2)
        .position(|w| percent_change >= w[0] && percent_change <= w[1])
        .unwrap_or(last - 1);

    let (lo, hi) = (BREAKPOINTS[i], BREAKPOINTS[i + 1]);
    let t = (percent_change - lo) / (hi - lo);
    PALETTE[i].lerp(PALETTE[i + 1], t)
}
