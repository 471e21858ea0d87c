use crate::error::{Result, VaxError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const SAMPLE_CATALOG: &str = include_str!("sample_catalog.yaml");

// ---------------------------------------------------------------------------
// SlotRow
// ---------------------------------------------------------------------------

/// Available slots at one hospital on one date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateSlots {
    pub date: String,
    pub slots: u32,
}

impl DateSlots {
    pub fn new(date: impl Into<String>, slots: u32) -> Self {
        Self {
            date: date.into(),
            slots,
        }
    }
}

/// One row of the availability table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotRow {
    pub dose: String,
    pub age_group: String,
    pub state: String,
    pub district: String,
    pub hospital: String,
    pub vaccine: String,
    /// Date label → slot count, in the row's declared order.
    #[serde(with = "ordered_slots")]
    pub slots_by_date: Vec<DateSlots>,
}

impl SlotRow {
    fn validate(&self, index: usize) -> Result<()> {
        let fields = [
            ("dose", &self.dose),
            ("age_group", &self.age_group),
            ("state", &self.state),
            ("district", &self.district),
            ("hospital", &self.hospital),
            ("vaccine", &self.vaccine),
        ];
        if !is_dose_number(&self.dose) {
            return Err(VaxError::InvalidCatalog(format!(
                "row {index}: dose '{}' is not a positive whole number without leading zeros",
                self.dose
            )));
        }
        for (name, value) in fields {
            if value.trim().is_empty() {
                return Err(VaxError::InvalidCatalog(format!(
                    "row {index}: field '{name}' is empty"
                )));
            }
            if !is_wire_safe(value) {
                return Err(VaxError::InvalidCatalog(format!(
                    "row {index}: field '{name}' contains '{{' or a line break"
                )));
            }
        }
        for entry in &self.slots_by_date {
            if entry.date.trim().is_empty() {
                return Err(VaxError::InvalidCatalog(format!(
                    "row {index}: empty date label (slots {})",
                    entry.slots
                )));
            }
            if !is_wire_safe(&entry.date) {
                return Err(VaxError::InvalidCatalog(format!(
                    "row {index}: date label '{}' contains '{{' or a line break",
                    entry.date
                )));
            }
        }
        Ok(())
    }
}

/// Echo lines carry catalog values, and clients split text from option
/// mappings at the first `{`.
/// Dose values key the dose menu, so they must be what a client can type.
fn is_dose_number(value: &str) -> bool {
    let mut bytes = value.bytes();
    matches!(bytes.next(), Some(b'1'..=b'9')) && bytes.all(|b| b.is_ascii_digit())
}

fn is_wire_safe(value: &str) -> bool {
    !value.contains(|c: char| matches!(c, '{' | '\n' | '\r'))
}

/// (De)serialize `Vec<DateSlots>` as a mapping while keeping document order.
mod ordered_slots {
    use super::DateSlots;
    use serde::de::{MapAccess, Visitor};
    use serde::ser::SerializeMap;
    use serde::{Deserializer, Serializer};
    use std::fmt;

    pub fn serialize<S: Serializer>(slots: &[DateSlots], s: S) -> Result<S::Ok, S::Error> {
        let mut map = s.serialize_map(Some(slots.len()))?;
        for entry in slots {
            map.serialize_entry(&entry.date, &entry.slots)?;
        }
        map.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<DateSlots>, D::Error> {
        struct SlotsVisitor;

        impl<'de> Visitor<'de> for SlotsVisitor {
            type Value = Vec<DateSlots>;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a mapping of date label to slot count")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut out = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((date, slots)) = access.next_entry::<String, u32>()? {
                    out.push(DateSlots { date, slots });
                }
                Ok(out)
            }
        }

        d.deserialize_map(SlotsVisitor)
    }
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// Read-only availability table, loaded once per process.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Catalog {
    rows: Vec<SlotRow>,
}

impl Catalog {
    pub fn from_rows(rows: Vec<SlotRow>) -> Result<Self> {
        for (i, row) in rows.iter().enumerate() {
            row.validate(i)?;
        }
        Ok(Self { rows })
    }

    pub fn from_yaml_str(data: &str) -> Result<Self> {
        let rows: Vec<SlotRow> = serde_yaml::from_str(data)?;
        Self::from_rows(rows)
    }

    pub fn from_json_str(data: &str) -> Result<Self> {
        let rows: Vec<SlotRow> = serde_json::from_str(data)?;
        Self::from_rows(rows)
    }

    /// The mock table shipped with the binary.
    pub fn sample() -> Result<Self> {
        Self::from_yaml_str(SAMPLE_CATALOG)
    }

    pub fn sample_yaml() -> &'static str {
        SAMPLE_CATALOG
    }

    /// Load from a `.yaml`/`.yml` or `.json` file.
    pub fn load(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let data = std::fs::read_to_string(path)?;
        match ext.as_str() {
            "yaml" | "yml" => Self::from_yaml_str(&data),
            "json" => Self::from_json_str(&data),
            _ => Err(VaxError::UnknownCatalogFormat(path.display().to_string())),
        }
    }

    pub fn rows(&self) -> &[SlotRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Providers
// ---------------------------------------------------------------------------

/// Source of the initial catalog.
pub trait CatalogProvider {
    fn load_catalog(&self) -> Result<Catalog>;
}

/// Reads the catalog from a file on disk.
pub struct FileCatalog {
    path: PathBuf,
}

impl FileCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CatalogProvider for FileCatalog {
    fn load_catalog(&self) -> Result<Catalog> {
        Catalog::load(&self.path)
    }
}

/// Serves the bundled mock table.
pub struct SampleCatalog;

impl CatalogProvider for SampleCatalog {
    fn load_catalog(&self) -> Result<Catalog> {
        Catalog::sample()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const ONE_ROW: &str = r#"
- dose: "2"
  age_group: "18+"
  state: Ladakh
  district: Kargil
  hospital: MedStar Hospital Center
  vaccine: Covaxin
  slots_by_date:
    May 16: 81
    May 15: 0
"#;

    #[test]
    fn yaml_keeps_declared_date_order() {
        let catalog = Catalog::from_yaml_str(ONE_ROW).unwrap();
        let dates: Vec<&str> = catalog.rows()[0]
            .slots_by_date
            .iter()
            .map(|d| d.date.as_str())
            .collect();
        assert_eq!(dates, ["May 16", "May 15"]);
    }

    #[test]
    fn json_roundtrip_preserves_rows() {
        let catalog = Catalog::from_yaml_str(ONE_ROW).unwrap();
        let json = serde_json::to_string(&catalog).unwrap();
        assert!(json.contains(r#""slots_by_date":{"May 16":81,"May 15":0}"#));
        let back = Catalog::from_json_str(&json).unwrap();
        assert_eq!(back, catalog);
    }

    #[test]
    fn empty_field_is_rejected() {
        let data = ONE_ROW.replace("district: Kargil", "district: \"\"");
        let err = Catalog::from_yaml_str(&data).unwrap_err();
        assert!(matches!(err, VaxError::InvalidCatalog(ref m) if m.contains("district")));
    }

    #[test]
    fn brace_in_a_field_is_rejected() {
        let data = ONE_ROW.replace("hospital: MedStar Hospital Center", "hospital: \"MedStar {HQ}\"");
        let err = Catalog::from_yaml_str(&data).unwrap_err();
        assert!(matches!(err, VaxError::InvalidCatalog(ref m) if m.contains("hospital")));
    }

    #[test]
    fn dose_must_be_a_plain_number() {
        for dose in ["Booster", "02", "0", "", "-1", "2nd"] {
            let data = ONE_ROW.replace("dose: \"2\"", &format!("dose: \"{dose}\""));
            let err = Catalog::from_yaml_str(&data).unwrap_err();
            assert!(
                matches!(err, VaxError::InvalidCatalog(ref m) if m.contains("dose")),
                "{dose} accepted"
            );
        }
        let data = ONE_ROW.replace("dose: \"2\"", "dose: \"12\"");
        assert!(Catalog::from_yaml_str(&data).is_ok());
    }

    #[test]
    fn negative_slot_count_fails_to_parse() {
        let data = ONE_ROW.replace("May 15: 0", "May 15: -3");
        assert!(Catalog::from_yaml_str(&data).is_err());
    }

    #[test]
    fn sample_catalog_loads() {
        let catalog = SampleCatalog.load_catalog().unwrap();
        assert!(!catalog.is_empty());
        assert!(catalog
            .rows()
            .iter()
            .any(|r| r.hospital == "MedStar Hospital Center" && r.slots_by_date.len() == 7));
    }

    #[test]
    fn file_provider_dispatches_on_extension() {
        let dir = TempDir::new().unwrap();
        let yaml = dir.path().join("rows.yaml");
        std::fs::write(&yaml, ONE_ROW).unwrap();
        assert_eq!(FileCatalog::new(&yaml).load_catalog().unwrap().len(), 1);

        let txt = dir.path().join("rows.txt");
        std::fs::write(&txt, ONE_ROW).unwrap();
        assert!(matches!(
            FileCatalog::new(&txt).load_catalog(),
            Err(VaxError::UnknownCatalogFormat(_))
        ));
    }
}
