pub const RAIN_PROTECTION: &str = "bring rain protection";
pub const JACKET: &str = "wear a jacket";
pub const LIGHT_CLOTHING: &str = "wear light clothing";
pub const WINDBREAKER: &str = "wear a windbreaker";
pub const CASUAL: &str = "casual/comfortable outfit";

/// Outfit recommendation. Rules are checked in order and the first match
/// wins, so rain always beats temperature, and temperature beats wind.
///
/// Wind speed is in km/h.
pub fn suggest_outfit(temperature_c: f64, wind_kmh: f64, precipitation_mm: f64) -> &'static str {
    if precipitation_mm > 0.0 {
        RAIN_PROTECTION
    } else if temperature_c < 10.0 {
        JACKET
    } else if temperature_c > 25.0 {
        LIGHT_CLOTHING
    } else if wind_kmh > 20.0 {
        WINDBREAKER
    } else {
        CASUAL
    }
}
