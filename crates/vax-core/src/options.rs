use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::fmt;

// ---------------------------------------------------------------------------
// OptionSet
// ---------------------------------------------------------------------------

/// Keyed choices in presentation order.
///
/// Serializes as a map (`{"1": ..., "2": ...}`), which is also the form sent
/// over the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionSet<T> {
    entries: Vec<(String, T)>,
}

impl<T> Default for OptionSet<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<T> OptionSet<T> {
    /// Number the values `1..=N` in iteration order.
    pub fn numbered(values: impl IntoIterator<Item = T>) -> Self {
        let entries = values
            .into_iter()
            .enumerate()
            .map(|(i, v)| ((i + 1).to_string(), v))
            .collect();
        Self { entries }
    }

    /// Use caller-supplied keys. Later duplicates of an existing key are dropped.
    pub fn keyed(pairs: impl IntoIterator<Item = (String, T)>) -> Self {
        let mut entries: Vec<(String, T)> = Vec::new();
        for (key, value) in pairs {
            if !entries.iter().any(|(k, _)| *k == key) {
                entries.push((key, value));
            }
        }
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&T> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.entries.iter().map(|(_, v)| v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Resolve a client reply to an entry.
    ///
    /// The reply must be a non-zero base-10 integer naming a key; leading
    /// zeros are ignored. Anything else resolves to `None`.
    pub fn resolve(&self, input: &str) -> Option<&T> {
        if input.is_empty() || !input.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let n: u64 = input.parse().ok()?;
        if n == 0 {
            return None;
        }
        self.get(&n.to_string())
    }

    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> OptionSet<U> {
        OptionSet {
            entries: self.entries.into_iter().map(|(k, v)| (k, f(v))).collect(),
        }
    }
}

impl<T: Serialize> Serialize for OptionSet<T> {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        let mut map = s.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

// ---------------------------------------------------------------------------
// Level-specific values
// ---------------------------------------------------------------------------

/// A dose value, shown as `Dose <value>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoseOption {
    pub dose: String,
}

impl fmt::Display for DoseOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Dose {}", self.dose)
    }
}

impl Serialize for DoseOption {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(self)
    }
}

/// A hospital together with the vaccine it administers.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct HospitalOption {
    pub hospital: String,
    pub vaccine: String,
}

impl fmt::Display for HospitalOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.hospital, self.vaccine)
    }
}

impl Serialize for HospitalOption {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        let mut map = s.serialize_map(Some(1))?;
        map.serialize_entry(&self.hospital, &self.vaccine)?;
        map.end()
    }
}

/// A date and the slots still open on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotOption {
    pub date: String,
    pub slots: u32,
}

impl fmt::Display for SlotOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} slot(s)", self.date, self.slots)
    }
}

impl Serialize for SlotOption {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        let mut map = s.serialize_map(Some(1))?;
        map.serialize_entry(&self.date, &self.slots)?;
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn states() -> OptionSet<String> {
        OptionSet::numbered(["Goa", "Kerala", "Ladakh"].map(String::from))
    }

    #[test]
    fn numbered_keys_are_contiguous_from_one() {
        let set = states();
        let keys: Vec<&str> = set.keys().collect();
        assert_eq!(keys, ["1", "2", "3"]);
    }

    #[test]
    fn resolve_accepts_only_in_range_integers() {
        let set = states();
        assert_eq!(set.resolve("2").map(String::as_str), Some("Kerala"));
        assert_eq!(set.resolve("03").map(String::as_str), Some("Ladakh"));
        assert!(set.resolve("0").is_none());
        assert!(set.resolve("4").is_none());
        assert!(set.resolve("-1").is_none());
        assert!(set.resolve("two").is_none());
        assert!(set.resolve("").is_none());
        assert!(set.resolve("99999999999999999999999").is_none());
    }

    #[test]
    fn keyed_drops_duplicate_keys() {
        let set = OptionSet::keyed([
            ("1".to_string(), "a"),
            ("2".to_string(), "b"),
            ("1".to_string(), "c"),
        ]);
        assert_eq!(set.len(), 2);
        assert_eq!(set.get("1"), Some(&"a"));
    }

    #[test]
    fn serializes_as_ordered_map() {
        let set = OptionSet::numbered(vec![
            SlotOption {
                date: "May 15".into(),
                slots: 0,
            },
            SlotOption {
                date: "May 16".into(),
                slots: 81,
            },
        ]);
        assert_eq!(
            serde_json::to_string(&set).unwrap(),
            r#"{"1":{"May 15":0},"2":{"May 16":81}}"#
        );

        let doses = OptionSet::keyed([(
            "2".to_string(),
            DoseOption { dose: "2".into() },
        )]);
        assert_eq!(serde_json::to_string(&doses).unwrap(), r#"{"2":"Dose 2"}"#);
    }
}
