/// Column names as they appear in the site's header row.
pub mod field {
    pub const TIME: &str = "Time";
    pub const TEMP: &str = "Temp";
    pub const WIND: &str = "Wind";
    pub const DIRECTION: &str = "Direction";
    pub const HUMIDITY: &str = "Humidity";
    pub const BAROMETER: &str = "Barometer";
    pub const VISIBILITY: &str = "Visibility";

    /// Synthetic first column in multi-day output.
    pub const DAY: &str = "Day";
}

/// One observation row: field name to cleaned value, in column order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeatherRecord {
    fields: Vec<(String, String)>,
}

impl WeatherRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `key`, replacing the value in place if it already exists.
    pub fn insert(&mut self, key: &str, value: String) {
        match self.fields.iter_mut().find(|(k, _)| k == key) {
            Some((_, v)) => *v = value,
            None => self.fields.push((key.to_string(), value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    #[cfg(test)]
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(_, v)| v.as_str())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut String)> {
        self.fields.iter_mut().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for WeatherRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = WeatherRecord::new();
        for (k, v) in iter {
            let key: String = k.into();
            record.insert(&key, v.into());
        }
        record
    }
}

pub struct Day {
    pub key: String,
    pub records: Vec<WeatherRecord>,
}

/// Observations grouped by date label, in the order they were fetched.
#[derive(Default)]
pub struct DaySet {
    days: Vec<Day>,
}

impl DaySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: impl Into<String>, records: Vec<WeatherRecord>) {
        self.days.push(Day {
            key: key.into(),
            records,
        });
    }

    pub fn iter(&self) -> impl Iterator<Item = &Day> {
        self.days.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.days.iter().map(|d| d.key.as_str())
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn record_count(&self) -> usize {
        self.days.iter().map(|d| d.records.len()).sum()
    }

    /// True when there is no record to write, even if some days were pushed.
    pub fn is_empty(&self) -> bool {
        self.record_count() == 0
    }

    pub fn first_record(&self) -> Option<&WeatherRecord> {
        self.days.iter().flat_map(|d| d.records.iter()).next()
    }
}

#[test]
fn test_insert_replaces_in_place() {
    let mut record: WeatherRecord = [("Time", "00:30"), ("Temp", "26 °C")].into_iter().collect();
    record.insert("Time", "01:00".to_string());
    record.insert("Wind", "7".to_string());

    assert_eq!(record.keys().collect::<Vec<_>>(), ["Time", "Temp", "Wind"]);
    assert_eq!(record.get("Time"), Some("01:00"));
    assert_eq!(record.get("Humidity"), None);
}

#[test]
fn test_dayset_empty_days() {
    let mut days = DaySet::new();
    days.push("2023-07-01", vec![]);
    assert_eq!(days.len(), 1);
    assert!(days.is_empty());
    assert!(days.first_record().is_none());

    days.push("2023-07-02", vec![WeatherRecord::new()]);
    assert!(!days.is_empty());
    assert_eq!(days.record_count(), 1);
}
