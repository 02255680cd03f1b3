//! Region selection and subtype derivation.
//!
//! [`SelectionFlow`] owns the catalog and the ephemeral selection state. The
//! displayed subtype list is always recomputed through [`derive_subtypes`], so
//! it can never drift from the current (region, category) pair.

use crate::catalog::{Catalog, Region, Subtype};
use crate::error::{LocatorError, SelectionError};
use url::Url;

pub const NO_DOCUMENT_NOTICE: &str = "No document available for this subtype.";

/// How subtypes are listed once a region is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlowVariant {
    /// Every subtype of the region, sorted by category then subtype name
    Flat,
    /// Nothing until a category is picked, then that category in catalog order
    #[default]
    ByCategory,
}

/// Position of a subtype inside the selected region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubtypeRef {
    pub category: usize,
    pub subtype: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    region: Option<usize>,
    category: Option<usize>,
    subtypes: Vec<SubtypeRef>,
}

impl SelectionState {
    pub fn is_empty(&self) -> bool {
        self.region.is_none() && self.category.is_none() && self.subtypes.is_empty()
    }
}

/// Side effects an activated subtype can request from its host
pub trait Host {
    fn open_document(&mut self, url: &Url);
    fn notify(&mut self, message: &str);
}

/// What happened when a subtype was activated
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activation {
    Opened(Url),
    NoDocument,
    InvalidLocator(String),
}

/// Base URL that document locators are resolved against
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentOrigin {
    base: Url,
}

impl DocumentOrigin {
    /// Treats `base` as a directory: `http://host` and `http://host/` behave alike
    pub fn new(mut base: Url) -> Self {
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Self { base }
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// `/pdfs/gir.pdf` against `http://host/app/` gives `http://host/app/pdfs/gir.pdf`.
    ///
    /// The result always stays under the base: absolute URLs and `..` paths
    /// climbing above it are rejected.
    pub fn resolve(&self, locator: &str) -> Result<Url, LocatorError> {
        let locator = locator.trim();
        if Url::parse(locator).is_ok() {
            return Err(LocatorError::Absolute);
        }

        let url = self.base.join(locator.trim_start_matches('/'))?;
        // Compared piecewise: `file:` origins are opaque and never equal
        let same_origin = url.scheme() == self.base.scheme()
            && url.host_str() == self.base.host_str()
            && url.port_or_known_default() == self.base.port_or_known_default();
        if !same_origin || !url.path().starts_with(self.base.path()) {
            return Err(LocatorError::OutsideOrigin {
                base: self.base.to_string(),
            });
        }
        Ok(url)
    }
}

/// Subtypes to display for a region and optional category.
///
/// `Flat` ignores `category` and lists everything sorted by names;
/// `ByCategory` lists nothing until a category is given.
pub fn derive_subtypes(
    region: &Region,
    category: Option<usize>,
    variant: FlowVariant,
) -> Vec<SubtypeRef> {
    match variant {
        FlowVariant::Flat => {
            let mut refs: Vec<SubtypeRef> = region
                .categories
                .iter()
                .enumerate()
                .flat_map(|(ci, c)| {
                    (0..c.subtypes.len()).map(move |si| SubtypeRef {
                        category: ci,
                        subtype: si,
                    })
                })
                .collect();
            refs.sort_by(|a, b| {
                let (ca, cb) = (&region.categories[a.category], &region.categories[b.category]);
                ca.name
                    .cmp(&cb.name)
                    .then_with(|| ca.subtypes[a.subtype].name.cmp(&cb.subtypes[b.subtype].name))
            });
            refs
        }
        FlowVariant::ByCategory => match category.and_then(|ci| region.categories.get(ci).map(|c| (ci, c))) {
            Some((ci, c)) => (0..c.subtypes.len())
                .map(|si| SubtypeRef {
                    category: ci,
                    subtype: si,
                })
                .collect(),
            None => Vec::new(),
        },
    }
}

pub struct SelectionFlow {
    catalog: Catalog,
    variant: FlowVariant,
    origin: DocumentOrigin,
    state: SelectionState,
}

impl SelectionFlow {
    pub fn new(catalog: Catalog, variant: FlowVariant, origin: DocumentOrigin) -> Self {
        Self {
            catalog,
            variant,
            origin,
            state: SelectionState::default(),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn variant(&self) -> FlowVariant {
        self.variant
    }

    pub fn origin(&self) -> &DocumentOrigin {
        &self.origin
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn region(&self) -> Option<&Region> {
        self.state.region.and_then(|ri| self.catalog.get(ri))
    }

    pub fn category_index(&self) -> Option<usize> {
        self.state.category
    }

    pub fn category(&self) -> Option<&crate::catalog::Category> {
        let region = self.region()?;
        self.state.category.and_then(|ci| region.categories.get(ci))
    }

    /// Displayed subtypes, in display order
    pub fn subtypes(&self) -> Vec<&Subtype> {
        let Some(region) = self.region() else {
            return Vec::new();
        };
        self.state
            .subtypes
            .iter()
            .map(|r| &region.categories[r.category].subtypes[r.subtype])
            .collect()
    }

    /// Display entry at `index` with the name of the category it belongs to
    pub fn displayed(&self, index: usize) -> Option<(&str, &Subtype)> {
        let region = self.region()?;
        let r = self.state.subtypes.get(index)?;
        let category = &region.categories[r.category];
        Some((category.name.as_str(), &category.subtypes[r.subtype]))
    }

    pub fn displayed_len(&self) -> usize {
        self.state.subtypes.len()
    }

    /// Make `name` the current region and reset the category choice
    pub fn select_region(&mut self, name: &str) -> Result<&Region, SelectionError> {
        let ri = self
            .catalog
            .region_index(name)
            .ok_or_else(|| SelectionError::RegionNotFound(name.to_string()))?;

        let region = &self.catalog.regions()[ri];
        self.state = SelectionState {
            region: Some(ri),
            category: None,
            subtypes: derive_subtypes(region, None, self.variant),
        };
        tracing::info!(region = %region.name, shown = self.state.subtypes.len(), "selected region");
        Ok(region)
    }

    /// Narrow the display to one category of the current region
    pub fn select_category(&mut self, name: &str) -> Result<(), SelectionError> {
        if self.variant == FlowVariant::Flat {
            return Err(SelectionError::CategoriesDisabled);
        }
        let region = self.region().ok_or(SelectionError::NoRegionSelected)?;
        let ci = region
            .category_index(name)
            .ok_or_else(|| SelectionError::CategoryNotFound {
                region: region.name.clone(),
                category: name.to_string(),
            })?;

        let subtypes = derive_subtypes(region, Some(ci), self.variant);
        tracing::info!(region = %region.name, category = name, shown = subtypes.len(), "selected category");
        self.state.category = Some(ci);
        self.state.subtypes = subtypes;
        Ok(())
    }

    /// Open the subtype's document through `host`, or tell the user there is none.
    ///
    /// Exactly one host call is made either way.
    pub fn activate_subtype(&self, subtype: &Subtype, host: &mut impl Host) -> Activation {
        let Some(locator) = subtype.locator() else {
            tracing::info!(subtype = %subtype.name, "no document for subtype");
            host.notify(NO_DOCUMENT_NOTICE);
            return Activation::NoDocument;
        };

        match self.origin.resolve(locator) {
            Ok(url) => {
                tracing::info!(subtype = %subtype.name, %url, "opening document");
                host.open_document(&url);
                Activation::Opened(url)
            }
            Err(e) => {
                tracing::warn!(subtype = %subtype.name, locator, error = %e, "unresolvable document path");
                host.notify(&format!("Invalid document path {locator:?}: {e}"));
                Activation::InvalidLocator(locator.to_string())
            }
        }
    }

    /// Back to no selection
    pub fn dismiss(&mut self) {
        self.state = SelectionState::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Category, Region};

    #[derive(Default)]
    struct Recorder {
        opened: Vec<Url>,
        notices: Vec<String>,
    }

    impl Host for Recorder {
        fn open_document(&mut self, url: &Url) {
            self.opened.push(url.clone());
        }

        fn notify(&mut self, message: &str) {
            self.notices.push(message.to_string());
        }
    }

    fn category(name: &str, subtypes: &[(&str, Option<&str>)]) -> Category {
        Category {
            name: name.into(),
            subtypes: subtypes.iter().map(|&(n, l)| Subtype::new(n, l)).collect(),
        }
    }

    fn catalog() -> Catalog {
        Catalog::new(vec![
            Region {
                name: "Punjab".into(),
                categories: vec![
                    category("Cattle", &[("Gir", Some("/pdfs/gir.pdf")), ("Sahiwal", None)]),
                    category("Buffalo", &[("Nili-Ravi", Some("pdfs/nili.pdf")), ("Murrah", None)]),
                ],
            },
            Region {
                name: "Gujarat".into(),
                categories: vec![
                    category("Sheep", &[("Patanwadi", None)]),
                    category("Cattle", &[("Kankrej", None), ("Dangi", None)]),
                ],
            },
            Region {
                name: "Goa".into(),
                categories: vec![],
            },
        ])
    }

    fn origin() -> DocumentOrigin {
        DocumentOrigin::new(Url::parse("http://localhost:3000").unwrap())
    }

    fn flow(variant: FlowVariant) -> SelectionFlow {
        SelectionFlow::new(catalog(), variant, origin())
    }

    fn names(flow: &SelectionFlow) -> Vec<&str> {
        flow.subtypes().iter().map(|s| s.name.as_str()).collect()
    }

    #[test]
    fn test_starts_empty() {
        let flow = flow(FlowVariant::ByCategory);
        assert!(flow.state().is_empty());
        assert!(flow.region().is_none());
        assert!(flow.subtypes().is_empty());
    }

    #[test]
    fn test_punjab_cattle_scenario() {
        let mut flow = flow(FlowVariant::ByCategory);
        flow.select_region("Punjab").unwrap();
        assert!(flow.subtypes().is_empty());

        flow.select_category("Cattle").unwrap();
        assert_eq!(names(&flow), ["Gir", "Sahiwal"]);

        let mut host = Recorder::default();
        let subtypes = flow.subtypes();
        let gir = subtypes[0];
        let outcome = flow.activate_subtype(gir, &mut host);
        assert_eq!(host.opened.len(), 1);
        assert_eq!(host.opened[0].as_str(), "http://localhost:3000/pdfs/gir.pdf");
        assert!(host.notices.is_empty());
        assert!(matches!(outcome, Activation::Opened(_)));

        let mut host = Recorder::default();
        let sahiwal = subtypes[1];
        assert_eq!(flow.activate_subtype(sahiwal, &mut host), Activation::NoDocument);
        assert!(host.opened.is_empty());
        assert_eq!(host.notices, [NO_DOCUMENT_NOTICE]);
    }

    #[test]
    fn test_flat_lists_union_of_categories_sorted() {
        let mut flow = flow(FlowVariant::Flat);
        for region in catalog().regions() {
            flow.select_region(&region.name).unwrap();

            let mut shown: Vec<_> = names(&flow).into_iter().map(String::from).collect();
            let mut expected: Vec<_> = region
                .categories
                .iter()
                .flat_map(|c| c.subtypes.iter().map(|s| s.name.clone()))
                .collect();
            shown.sort();
            expected.sort();
            assert_eq!(shown, expected, "region {}", region.name);
            assert!(flow.category().is_none());
        }

        flow.select_region("Punjab").unwrap();
        // Buffalo before Cattle, then by subtype name within each
        assert_eq!(names(&flow), ["Murrah", "Nili-Ravi", "Gir", "Sahiwal"]);
    }

    #[test]
    fn test_category_lists_catalog_order() {
        let mut flow = flow(FlowVariant::ByCategory);
        for region in catalog().regions() {
            flow.select_region(&region.name).unwrap();
            for c in &region.categories {
                flow.select_category(&c.name).unwrap();
                let shown: Vec<&Subtype> = flow.subtypes();
                let expected: Vec<&Subtype> = c.subtypes.iter().collect();
                assert_eq!(shown, expected);
            }
        }
    }

    #[test]
    fn test_region_change_clears_category() {
        let mut flow = flow(FlowVariant::ByCategory);
        flow.select_region("Punjab").unwrap();
        flow.select_category("Buffalo").unwrap();
        assert_eq!(flow.category().map(|c| c.name.as_str()), Some("Buffalo"));

        flow.select_region("Gujarat").unwrap();
        assert!(flow.category().is_none());
        assert!(flow.subtypes().is_empty());

        // Same category name resolves inside the new region
        flow.select_category("Cattle").unwrap();
        assert_eq!(names(&flow), ["Kankrej", "Dangi"]);
    }

    #[test]
    fn test_lookup_misses_leave_state_unchanged() {
        let mut flow = flow(FlowVariant::ByCategory);
        assert_eq!(flow.select_category("Cattle"), Err(SelectionError::NoRegionSelected));

        flow.select_region("Punjab").unwrap();
        flow.select_category("Cattle").unwrap();
        let before = flow.state().clone();

        let err = flow.select_region("Lakshadweep").unwrap_err();
        assert_eq!(err, SelectionError::RegionNotFound("Lakshadweep".into()));
        assert_eq!(flow.state(), &before);

        let err = flow.select_category("Camel").unwrap_err();
        assert!(matches!(err, SelectionError::CategoryNotFound { .. }));
        assert_eq!(flow.state(), &before);
    }

    #[test]
    fn test_flat_rejects_category_selection() {
        let mut flow = flow(FlowVariant::Flat);
        flow.select_region("Punjab").unwrap();
        let before = flow.state().clone();
        assert_eq!(flow.select_category("Cattle"), Err(SelectionError::CategoriesDisabled));
        assert_eq!(flow.state(), &before);
    }

    #[test]
    fn test_dismiss_is_idempotent() {
        let mut flow = flow(FlowVariant::ByCategory);
        flow.select_region("Punjab").unwrap();
        flow.select_category("Cattle").unwrap();

        flow.dismiss();
        let once = flow.state().clone();
        flow.dismiss();
        assert_eq!(flow.state(), &once);
        assert_eq!(once, SelectionState::default());
        assert!(flow.region().is_none());
        assert!(flow.subtypes().is_empty());
    }

    #[test]
    fn test_displayed_carries_category_name() {
        let mut flow = flow(FlowVariant::Flat);
        flow.select_region("Gujarat").unwrap();
        assert_eq!(flow.displayed_len(), 3);
        let (category, subtype) = flow.displayed(2).unwrap();
        assert_eq!((category, subtype.name.as_str()), ("Sheep", "Patanwadi"));
        assert!(flow.displayed(3).is_none());
    }

    #[test]
    fn test_origin_resolution() {
        let origin = origin();
        assert_eq!(
            origin.resolve("/pdfs/gir.pdf").unwrap().as_str(),
            "http://localhost:3000/pdfs/gir.pdf"
        );
        assert_eq!(
            origin.resolve("pdfs/nili.pdf").unwrap().as_str(),
            "http://localhost:3000/pdfs/nili.pdf"
        );

        let nested = DocumentOrigin::new(Url::parse("file:///srv/livestock/public").unwrap());
        assert_eq!(
            nested.resolve("/pdfs/gir.pdf").unwrap().as_str(),
            "file:///srv/livestock/public/pdfs/gir.pdf"
        );
    }

    #[test]
    fn test_origin_confines_locators() {
        let origin = DocumentOrigin::new(Url::parse("http://host/app").unwrap());

        assert_eq!(origin.resolve("http://evil.example/x.pdf"), Err(LocatorError::Absolute));
        assert_eq!(origin.resolve("mailto:vet@example.org"), Err(LocatorError::Absolute));
        assert!(matches!(
            origin.resolve("../../etc/x.pdf"),
            Err(LocatorError::OutsideOrigin { .. })
        ));
        assert!(matches!(
            origin.resolve("/pdfs/../../x.pdf"),
            Err(LocatorError::OutsideOrigin { .. })
        ));

        // Leading slashes never turn into a network-path reference
        assert_eq!(
            origin.resolve("//evil.example/x.pdf").unwrap().as_str(),
            "http://host/app/evil.example/x.pdf"
        );
        // `..` that stays inside the base is fine
        assert_eq!(
            origin.resolve("pdfs/old/../gir.pdf").unwrap().as_str(),
            "http://host/app/pdfs/gir.pdf"
        );
    }

    #[test]
    fn test_foreign_locator_becomes_notice() {
        let catalog = Catalog::new(vec![Region {
            name: "Andhra Pradesh".into(),
            categories: vec![category(
                "Cattle",
                &[("Ongole", Some("https://elsewhere.example/ongole.pdf")), ("Punganur", Some("file:///etc/punganur.pdf"))],
            )],
        }]);
        let mut flow = SelectionFlow::new(catalog, FlowVariant::Flat, origin());
        flow.select_region("Andhra Pradesh").unwrap();

        for idx in 0..2 {
            let mut host = Recorder::default();
            let (_, subtype) = flow.displayed(idx).unwrap();
            let outcome = flow.activate_subtype(subtype, &mut host);

            assert!(matches!(outcome, Activation::InvalidLocator(_)), "{outcome:?}");
            assert!(host.opened.is_empty());
            assert_eq!(host.notices.len(), 1);
            assert!(host.notices[0].starts_with("Invalid document path"));
        }
    }

    #[test]
    fn test_relative_locator_opens_once() {
        let mut flow = flow(FlowVariant::ByCategory);
        flow.select_region("Punjab").unwrap();
        flow.select_category("Buffalo").unwrap();

        let mut host = Recorder::default();
        let (_, nili) = flow.displayed(0).unwrap();
        flow.activate_subtype(nili, &mut host);
        assert_eq!(host.opened.len(), 1);
        assert_eq!(host.opened[0].path(), "/pdfs/nili.pdf");
        assert!(host.notices.is_empty());
    }
}
