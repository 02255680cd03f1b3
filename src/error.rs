use std::path::PathBuf;
use thiserror::Error;

/// Failures while loading the livestock catalog
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed catalog {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: simd_json::Error,
    },
}

/// Failures while loading region polygons
#[derive(Debug, Error)]
pub enum GeoDataError {
    #[error("failed to read geodata {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed geodata {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: Box<geojson::Error>,
    },

    #[error("geodata {path} contains no named polygon features")]
    NoRegions { path: PathBuf },
}

/// Rejected selection-flow inputs. The flow state is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("no livestock records for region {0:?}")]
    RegionNotFound(String),

    #[error("region {region:?} has no livestock category {category:?}")]
    CategoryNotFound { region: String, category: String },

    #[error("no region is selected")]
    NoRegionSelected,

    #[error("category selection is disabled in the flat listing")]
    CategoriesDisabled,
}

/// Document paths that cannot be resolved under the document origin
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocatorError {
    #[error("absolute URLs are not document paths")]
    Absolute,

    #[error("path leaves the document origin {base}")]
    OutsideOrigin { base: String },

    #[error(transparent)]
    Parse(#[from] url::ParseError),
}

/// Failures handing a document to the host viewer
#[derive(Debug, Error)]
pub enum ViewerError {
    #[error("failed to launch {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("document opener command is empty")]
    EmptyCommand,
}
