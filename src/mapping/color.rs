/// Converts HSL (hue in degrees, saturation and lightness in percent) to `#rrggbb`.
pub fn hsl_to_hex(hue: f64, saturation: f64, lightness: f64) -> String {
    let hue = hue.rem_euclid(360.0);
    let l = lightness / 100.0;
    let a = saturation / 100.0 * l.min(1.0 - l);

    let channel = |n: f64| -> u8 {
        let k = (n + hue / 30.0) % 12.0;
        let color = l - a * (k - 3.0).min(9.0 - k).min(1.0).max(-1.0);
        (255.0 * color).round().clamp(0.0, 255.0) as u8
    };

    format!("#{:02x}{:02x}{:02x}", channel(0.0), channel(8.0), channel(4.0))
}

/// Hue in degrees for a key: blue (240) at the bottom of the keyboard, red (0) at the top.
pub fn key_hue(normalized: f64) -> f64 {
    240.0 * (1.0 - normalized)
}
