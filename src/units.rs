use std::collections::HashMap;

use crate::settings::UnitMarkers;
use crate::weather::{field, WeatherRecord};

pub mod direction {
    const COMPASS: [&str; 16] = [
        "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW",
        "NW", "NNW",
    ];
    pub fn degree_to_compass<'a>(deg: f32) -> &'a str {
        let deg = (deg % 360.0) + 360.0;
        let val = (deg / 22.5 + 0.5) as usize;
        let idx = val % 16;
        COMPASS[idx]
    }

    /// Bearing from a tooltip such as "Wind blowing from 60° East-northeast to
    /// West-southwest". The first number directly before a `°` wins.
    pub fn bearing_from_tooltip(text: &str) -> Option<f32> {
        let deg = text.find('°')?;
        let head = &text[..deg];
        let start = head
            .char_indices()
            .rev()
            .find(|(_, c)| !(c.is_ascii_digit() || *c == '.'))
            .map_or(0, |(i, c)| i + c.len_utf8());
        head[start..].parse().ok()
    }

    #[test]
    fn test_degree_to_compass() {
        assert_eq!(degree_to_compass(0.0), "N");
        assert_eq!(degree_to_compass(45.0), "NE");
        assert_eq!(degree_to_compass(90.0), "E");
        assert_eq!(degree_to_compass(180.0), "S");
        assert_eq!(degree_to_compass(270.0), "W");
        assert_eq!(degree_to_compass(360.0), "N");
    }

    #[test]
    fn test_bearing_from_tooltip() {
        assert_eq!(
            bearing_from_tooltip("Wind blowing from 60° East-northeast to West-southwest"),
            Some(60.0)
        );
        assert_eq!(bearing_from_tooltip("from 247.5°"), Some(247.5));
        assert_eq!(bearing_from_tooltip("NE"), None);
        assert_eq!(bearing_from_tooltip("°"), None);
    }
}

/// How a single field is cleaned after whitespace collapsing.
#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    /// Keep the value as-is; no colon truncation.
    Verbatim,
    StripUnit(String),
    /// Strip the unit, and blank the value entirely if it reads `calm`.
    StripUnitOrCalm { unit: String, calm: String },
    /// Turn a bearing tooltip into a compass point.
    Compass,
}

impl Rule {
    fn apply(&self, value: String) -> String {
        match self {
            Rule::Verbatim => value,
            Rule::StripUnit(unit) => strip_unit(&value, unit),
            Rule::StripUnitOrCalm { unit, calm } => {
                if value == *calm {
                    String::new()
                } else {
                    strip_unit(&value, unit)
                }
            }
            Rule::Compass => match direction::bearing_from_tooltip(&value) {
                Some(deg) => direction::degree_to_compass(deg).to_string(),
                None => value,
            },
        }
    }
}

fn strip_unit(value: &str, unit: &str) -> String {
    if unit.is_empty() {
        return value.to_string();
    }
    collapse_whitespace(&value.replace(unit, ""))
}

pub fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Everything before the first `:`, trimmed.
pub fn truncate_at_colon(value: &str) -> &str {
    value.split(':').next().unwrap_or_default().trim_end()
}

/// Field-name keyed cleanup. Fields without a rule only get whitespace
/// collapsing and colon truncation.
#[derive(Debug, Clone)]
pub struct Normalizer {
    rules: HashMap<String, Rule>,
}

impl Normalizer {
    pub fn new(units: &UnitMarkers) -> Self {
        let rules = [
            (field::TEMP, Rule::StripUnit(units.temperature.clone())),
            (
                field::WIND,
                Rule::StripUnitOrCalm {
                    unit: units.wind_speed.clone(),
                    calm: units.calm.clone(),
                },
            ),
            (field::DIRECTION, Rule::Compass),
            (field::HUMIDITY, Rule::StripUnit(units.humidity.clone())),
            (field::BAROMETER, Rule::StripUnit(units.pressure.clone())),
            (field::VISIBILITY, Rule::StripUnit(units.visibility.clone())),
        ]
        .into_iter()
        .map(|(name, rule)| (name.to_string(), rule))
        .collect();

        Self { rules }
    }

    /// Adds or replaces the rule for `name`.
    pub fn with_rule(mut self, name: &str, rule: Rule) -> Self {
        self.rules.insert(name.to_string(), rule);
        self
    }

    pub fn normalize_value(&self, name: &str, raw: &str) -> String {
        let value = collapse_whitespace(raw);
        match self.rules.get(name) {
            Some(Rule::Verbatim) => value,
            Some(rule) => rule.apply(truncate_at_colon(&value).to_string()),
            None => truncate_at_colon(&value).to_string(),
        }
    }

    pub fn normalize(&self, record: &mut WeatherRecord) {
        for (name, value) in record.iter_mut() {
            *value = self.normalize_value(name, value);
        }
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(&UnitMarkers::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_record() -> WeatherRecord {
        [
            ("Time", "00:30"),
            ("Temp", "26\u{a0}°C"),
            ("Weather", "Passing  clouds."),
            ("Wind", "7 km/h"),
            (
                "Direction",
                "Wind blowing from 60° East-northeast to West-southwest",
            ),
            ("Humidity", "89%"),
            ("Barometer", "1010 mbar"),
            ("Visibility", "10 km"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn strips_units_per_field() {
        let mut record = raw_record();
        Normalizer::default().normalize(&mut record);

        assert_eq!(
            record.values().collect::<Vec<_>>(),
            ["00", "26", "Passing clouds.", "7", "ENE", "89", "1010", "10"]
        );
    }

    #[test]
    fn normalizing_twice_changes_nothing() {
        let normalizer = Normalizer::default();
        let mut once = raw_record();
        normalizer.normalize(&mut once);
        let mut twice = once.clone();
        normalizer.normalize(&mut twice);
        assert_eq!(once, twice);

        for (name, raw) in [("Wind", "No wind"), ("Weather", "12:30 Partly cloudy")] {
            let first = normalizer.normalize_value(name, raw);
            assert_eq!(normalizer.normalize_value(name, &first), first);
        }
    }

    #[test]
    fn calm_wind_is_blank() {
        let normalizer = Normalizer::default();
        assert_eq!(normalizer.normalize_value("Wind", "No wind"), "");
        assert_eq!(normalizer.normalize_value("Wind", " No   wind "), "");
        assert_eq!(normalizer.normalize_value("Wind", "24 km/h"), "24");
        assert_eq!(normalizer.normalize_value("Wind", "Calm"), "Calm");
    }

    #[test]
    fn colon_truncates() {
        let normalizer = Normalizer::default();
        assert_eq!(normalizer.normalize_value("Weather", "12:30 Partly cloudy"), "12");
        assert_eq!(normalizer.normalize_value("Unknown", "a:b:c"), "a");
        assert_eq!(normalizer.normalize_value("Time", "12:30 Partly cloudy"), "12");
        assert_eq!(normalizer.normalize_value("Time", "12:30"), "12");

        let normalizer = Normalizer::default().with_rule("Time", Rule::Verbatim);
        assert_eq!(normalizer.normalize_value("Time", "12:30"), "12:30");
    }

    #[test]
    fn unknown_fields_pass_through() {
        let normalizer = Normalizer::default();
        assert_eq!(normalizer.normalize_value("Dew point", "18 °C"), "18 °C");
    }

    #[test]
    fn direction_labels_are_kept() {
        let normalizer = Normalizer::default();
        assert_eq!(normalizer.normalize_value("Direction", "NE"), "NE");
        assert_eq!(normalizer.normalize_value("Direction", ""), "");
    }

    #[test]
    fn rules_can_be_replaced() {
        let normalizer = Normalizer::default()
            .with_rule("Temp", Rule::StripUnit("°F".to_string()))
            .with_rule("Dew point", Rule::StripUnit("°C".to_string()));
        assert_eq!(normalizer.normalize_value("Temp", "79 °F"), "79");
        assert_eq!(normalizer.normalize_value("Dew point", "18 °C"), "18");
    }
}
