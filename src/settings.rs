use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::Error;

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub base_url: String,

    pub user_agent: String,

    /// `id` of the observation table.
    pub table_id: String,

    /// `id` of the day-selector dropdown.
    pub selector_id: String,

    pub units: UnitMarkers,

    /// Keep `Time` values whole instead of cutting them at the first colon.
    pub keep_clock_time: bool,

    /// Unit suffix to strip for columns with no built-in rule, keyed by
    /// column name (e.g. `"Dew Point": "°C"`).
    pub extra_units: BTreeMap<String, String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: "https://www.timeanddate.com".to_string(),
            user_agent: "Mozilla/5.0".to_string(),
            table_id: "wt-his".to_string(),
            selector_id: "wt-his-select".to_string(),
            units: UnitMarkers::default(),
            keep_clock_time: false,
            extra_units: BTreeMap::new(),
        }
    }
}

impl Settings {
    /// Default settings overlaid with whatever keys the JSON file sets.
    pub fn from_file(path: &Path) -> Result<Self, Error> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct UnitMarkers {
    pub temperature: String,
    pub wind_speed: String,
    pub calm: String,
    pub humidity: String,
    pub pressure: String,
    pub visibility: String,
}

impl Default for UnitMarkers {
    fn default() -> Self {
        Self {
            temperature: "°C".to_string(),
            wind_speed: "km/h".to_string(),
            calm: "No wind".to_string(),
            humidity: "%".to_string(),
            pressure: "mbar".to_string(),
            visibility: "km".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let json = r#"{
            "user_agent": "wxhist-test",
            "units": {"temperature": "°F"},
            "extra_units": {"Dew Point": "°C"}
        }"#;
        file.write_all(json.as_bytes()).unwrap();

        let settings = Settings::from_file(file.path()).unwrap();
        assert_eq!(settings.user_agent, "wxhist-test");
        assert_eq!(settings.units.temperature, "°F");
        assert_eq!(settings.units.wind_speed, "km/h");
        assert_eq!(settings.table_id, "wt-his");
        assert!(!settings.keep_clock_time);
        assert_eq!(settings.extra_units["Dew Point"], "°C");
    }

    #[test]
    fn bad_json_is_a_settings_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        assert!(matches!(
            Settings::from_file(file.path()),
            Err(Error::Settings(_))
        ));
    }
}
