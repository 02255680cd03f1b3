use crate::error::CatalogError;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// A breed entry, optionally linked to a PDF document
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Subtype {
    pub name: String,
    #[serde(rename = "path_to_pdf", default)]
    locator: Option<String>,
}

impl Subtype {
    pub fn new(name: impl Into<String>, locator: Option<&str>) -> Self {
        Self {
            name: name.into(),
            locator: locator.map(str::to_string),
        }
    }

    /// Document path, if any. Empty strings count as missing.
    pub fn locator(&self) -> Option<&str> {
        self.locator.as_deref().filter(|l| !l.trim().is_empty())
    }
}

/// A livestock species recorded for a state
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Category {
    #[serde(rename = "animalname")]
    pub name: String,
    #[serde(default)]
    pub subtypes: Vec<Subtype>,
}

/// A state with its livestock categories
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Region {
    #[serde(rename = "state_name")]
    pub name: String,
    #[serde(rename = "animals", default)]
    pub categories: Vec<Category>,
}

impl Region {
    /// Find a category by name (first match in catalog order)
    pub fn category(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.name == name)
    }

    pub fn category_index(&self, name: &str) -> Option<usize> {
        self.categories.iter().position(|c| c.name == name)
    }

    /// Total number of subtypes across all categories
    pub fn subtype_count(&self) -> usize {
        self.categories.iter().map(|c| c.subtypes.len()).sum()
    }
}

/// The static region -> category -> subtype lookup, immutable once loaded
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Catalog {
    #[serde(rename = "states", default)]
    regions: Vec<Region>,
}

impl Catalog {
    pub fn new(regions: Vec<Region>) -> Self {
        Self { regions }
    }

    /// Load and validate a catalog file
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let mut bytes = fs::read(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = Self::from_slice(&mut bytes).map_err(|source| CatalogError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        catalog.warn_duplicates();
        tracing::debug!(
            regions = catalog.regions.len(),
            subtypes = catalog.regions.iter().map(Region::subtype_count).sum::<usize>(),
            "loaded catalog from {}",
            path.display()
        );
        Ok(catalog)
    }

    /// Parse catalog JSON in place (simd-json mutates the buffer)
    pub fn from_slice(bytes: &mut [u8]) -> Result<Self, simd_json::Error> {
        simd_json::serde::from_slice(bytes)
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn region(&self, name: &str) -> Option<&Region> {
        self.regions.iter().find(|r| r.name == name)
    }

    pub fn region_index(&self, name: &str) -> Option<usize> {
        self.regions.iter().position(|r| r.name == name)
    }

    pub fn get(&self, index: usize) -> Option<&Region> {
        self.regions.get(index)
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Lookups return the first match, so later duplicates are unreachable
    fn warn_duplicates(&self) {
        let mut seen = HashSet::new();
        for region in &self.regions {
            if !seen.insert(region.name.as_str()) {
                tracing::warn!(region = %region.name, "duplicate region in catalog, keeping the first");
            }

            let mut categories = HashSet::new();
            for category in &region.categories {
                if !categories.insert(category.name.as_str()) {
                    tracing::warn!(
                        region = %region.name,
                        category = %category.name,
                        "duplicate category in catalog, keeping the first"
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"{
        "states": [
            {
                "state_name": "Punjab",
                "animals": [
                    {
                        "animalname": "Cattle",
                        "subtypes": [
                            { "name": "Gir", "path_to_pdf": "/pdfs/gir.pdf" },
                            { "name": "Sahiwal", "path_to_pdf": null }
                        ]
                    },
                    {
                        "animalname": "Buffalo",
                        "subtypes": [
                            { "name": "Murrah", "path_to_pdf": "" },
                            { "name": "Nili-Ravi" }
                        ]
                    }
                ]
            },
            { "state_name": "Goa", "animals": [] }
        ]
    }"#;

    fn sample() -> Catalog {
        let mut bytes = SAMPLE.as_bytes().to_vec();
        Catalog::from_slice(&mut bytes).unwrap()
    }

    #[test]
    fn test_parse_nested_catalog() {
        let catalog = sample();
        assert_eq!(catalog.len(), 2);

        let punjab = catalog.region("Punjab").unwrap();
        assert_eq!(punjab.categories.len(), 2);
        assert_eq!(punjab.subtype_count(), 4);

        let cattle = punjab.category("Cattle").unwrap();
        let names: Vec<_> = cattle.subtypes.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["Gir", "Sahiwal"]);
    }

    #[test]
    fn test_missing_null_and_empty_locators() {
        let catalog = sample();
        let punjab = catalog.region("Punjab").unwrap();

        let cattle = punjab.category("Cattle").unwrap();
        assert_eq!(cattle.subtypes[0].locator(), Some("/pdfs/gir.pdf"));
        assert_eq!(cattle.subtypes[1].locator(), None);

        let buffalo = punjab.category("Buffalo").unwrap();
        assert_eq!(buffalo.subtypes[0].locator(), None);
        assert_eq!(buffalo.subtypes[1].locator(), None);
    }

    #[test]
    fn test_lookups_are_total() {
        let catalog = sample();
        assert!(catalog.region("Atlantis").is_none());
        assert!(catalog.region("punjab").is_none());
        assert!(catalog.region("Punjab").unwrap().category("Yak").is_none());
        assert_eq!(catalog.region_index("Goa"), Some(1));
        assert!(catalog.get(7).is_none());
    }

    #[test]
    fn test_duplicate_region_resolves_to_first() {
        let catalog = Catalog::new(vec![
            Region {
                name: "Assam".into(),
                categories: vec![],
            },
            Region {
                name: "Assam".into(),
                categories: vec![Category {
                    name: "Pig".into(),
                    subtypes: vec![],
                }],
            },
        ]);
        assert!(catalog.region("Assam").unwrap().categories.is_empty());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let catalog = Catalog::load(file.path()).unwrap();
        assert_eq!(catalog, sample());
    }

    #[test]
    fn test_load_reports_malformed_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{ \"states\": [ { \"state_name\": 3 } ] }").unwrap();

        let err = Catalog::load(file.path()).unwrap_err();
        assert!(matches!(err, CatalogError::Parse { .. }));
    }

    #[test]
    fn test_load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Catalog::load(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, CatalogError::Io { .. }));
    }
}
