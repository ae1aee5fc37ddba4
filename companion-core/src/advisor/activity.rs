use super::ConditionClass;

pub const WALK: &str = "walk recommended";
pub const STAY_INDOORS: &str = "stay indoors";
pub const OUTDOOR: &str = "outdoor activity recommended";
pub const MODERATE: &str = "moderate weather, plan accordingly";

/// Activity recommendation; the sky class is checked before temperature.
pub fn suggest_activity(class: ConditionClass, temperature_c: f64) -> &'static str {
    match class {
        ConditionClass::Clear => WALK,
        ConditionClass::Rain => STAY_INDOORS,
        ConditionClass::Other if temperature_c > 20.0 => OUTDOOR,
        ConditionClass::Other => MODERATE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_sky_means_walk_at_any_temperature() {
        assert_eq!(suggest_activity(ConditionClass::Clear, -3.0), WALK);
        assert_eq!(suggest_activity(ConditionClass::Clear, 30.0), WALK);
    }

    #[test]
    fn rain_means_indoors_even_when_warm() {
        assert_eq!(suggest_activity(ConditionClass::Rain, 28.0), STAY_INDOORS);
    }

    #[test]
    fn other_conditions_fall_back_to_temperature() {
        assert_eq!(suggest_activity(ConditionClass::Other, 20.5), OUTDOOR);
        assert_eq!(suggest_activity(ConditionClass::Other, 20.0), MODERATE);
        assert_eq!(suggest_activity(ConditionClass::Other, 4.0), MODERATE);
    }

    #[test]
    fn repeated_calls_agree() {
        for class in [ConditionClass::Clear, ConditionClass::Rain, ConditionClass::Other] {
            assert_eq!(suggest_activity(class, 20.5), suggest_activity(class, 20.5));
        }
    }
}
