//! Dataset catalog and per-call request types
//!
//! The catalog maps short dataset identifiers (`cand`, `bens`, ...) to the
//! resource name used by the remote archive and the local folder the
//! extracted file is stored under. A [`FetchRequest`] is resolved against the
//! catalog into a [`ResourceDescriptor`] that carries everything one fetch
//! needs to know about the remote side.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use url::Url;

use crate::app::cache::CacheKey;
use crate::constants::{storage, tse};
use crate::errors::{FetchError, FetchResult};

/// Static description of one dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatasetSpec {
    /// Identifier used on the command line and in cache keys
    pub id: &'static str,
    /// Resource name on the remote archive
    pub resource_name: &'static str,
    /// Folder under the destination base path
    pub destination_subfolder: &'static str,
    /// Human-readable description
    pub description: &'static str,
}

const BUILTIN_DATASETS: &[DatasetSpec] = &[
    DatasetSpec {
        id: "cand",
        resource_name: "consulta_cand",
        destination_subfolder: "candidatos",
        description: "Candidate data",
    },
    DatasetSpec {
        id: "cassacao",
        resource_name: "motivo_cassacao",
        destination_subfolder: "cassacao_candidatos",
        description: "Candidate removal reasons",
    },
    DatasetSpec {
        id: "bens",
        resource_name: "bem_candidato",
        destination_subfolder: "bens_candidatos",
        description: "Assets declared by candidates",
    },
    DatasetSpec {
        id: "vot_partido",
        resource_name: "votacao_partido_munzona",
        destination_subfolder: "votacao_partido_munzona",
        description: "Votes by party, municipality and zone",
    },
    DatasetSpec {
        id: "vot_cand",
        resource_name: "votacao_candidato_munzona",
        destination_subfolder: "votacao_candidato_munzona",
        description: "Votes by candidate, municipality and zone",
    },
    DatasetSpec {
        id: "comparecimento",
        resource_name: "perfil_comparecimento_abstencao",
        destination_subfolder: "comparecimento_abstencao",
        description: "Turnout and abstention",
    },
];

/// Ordered table of known datasets
#[derive(Debug, Clone)]
pub struct DatasetCatalog {
    datasets: Vec<DatasetSpec>,
}

impl Default for DatasetCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl DatasetCatalog {
    /// Catalog of the datasets published by the TSE open-data portal
    pub fn builtin() -> Self {
        Self {
            datasets: BUILTIN_DATASETS.to_vec(),
        }
    }

    /// Build a catalog from an explicit list
    pub fn from_specs(datasets: Vec<DatasetSpec>) -> Self {
        Self { datasets }
    }

    /// Look up a dataset by identifier
    pub fn get(&self, id: &str) -> Option<&DatasetSpec> {
        self.datasets.iter().find(|spec| spec.id == id)
    }

    /// Known identifiers in catalog order
    pub fn ids(&self) -> Vec<String> {
        self.datasets.iter().map(|spec| spec.id.to_string()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DatasetSpec> {
        self.datasets.iter()
    }

    /// Resolve a request into a descriptor of the remote resource
    ///
    /// # Errors
    ///
    /// Returns `FetchError::UnknownDataset` if the dataset type is not in the
    /// catalog, or `FetchError::InvalidUrl` if the archive URL cannot be built.
    pub fn descriptor(
        &self,
        request: &FetchRequest,
        base_url: &str,
    ) -> FetchResult<ResourceDescriptor> {
        let spec = self
            .get(&request.dataset_type)
            .ok_or_else(|| FetchError::UnknownDataset {
                dataset_type: request.dataset_type.clone(),
                known: self.ids(),
            })?;

        let archive_name = format!("{}_{}.zip", spec.resource_name, request.year);
        let raw_url = format!(
            "{}/{}/{}",
            base_url.trim_end_matches('/'),
            spec.resource_name,
            archive_name
        );
        let remote_archive_url = Url::parse(&raw_url).map_err(|e| FetchError::InvalidUrl {
            url: raw_url.clone(),
            error: e.to_string(),
        })?;

        Ok(ResourceDescriptor {
            resource_name: spec.resource_name.to_string(),
            year: request.year,
            remote_archive_url,
            archive_name,
            member: MemberPattern {
                suffix: tse::MEMBER_SUFFIX.to_string(),
                canonical_name: format!(
                    "{}_{}{}",
                    spec.resource_name,
                    request.year,
                    tse::MEMBER_SUFFIX
                ),
            },
            destination_subfolder: spec.destination_subfolder.to_string(),
        })
    }
}

/// Input of one fetch call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub dataset_type: String,
    pub year: u16,
    pub base_path: PathBuf,
    /// Transfer even when the cache says the local copy is current
    pub force: bool,
}

impl FetchRequest {
    pub fn new(dataset_type: impl Into<String>, year: u16, base_path: impl Into<PathBuf>) -> Self {
        Self {
            dataset_type: dataset_type.into(),
            year,
            base_path: base_path.into(),
            force: false,
        }
    }

    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Cache identity of this request
    pub fn cache_key(&self) -> CacheKey {
        CacheKey::new(&self.dataset_type, self.year)
    }
}

/// Which archive member to extract
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberPattern {
    /// Any member whose name ends with this suffix matches
    pub suffix: String,
    /// Exact name of the expected member
    pub canonical_name: String,
}

impl MemberPattern {
    pub fn matches(&self, member_name: &str) -> bool {
        member_name.ends_with(&self.suffix) || member_name == self.canonical_name
    }
}

/// Remote resource and local placement for one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceDescriptor {
    pub resource_name: String,
    pub year: u16,
    pub remote_archive_url: Url,
    /// File name of the archive on the remote side
    pub archive_name: String,
    pub member: MemberPattern,
    pub destination_subfolder: String,
}

impl ResourceDescriptor {
    /// Final file name, stamped with the ingestion date
    pub fn final_file_name(&self, ingestion_date: NaiveDate) -> String {
        format!(
            "{}_{}_{}_{}.{}",
            self.resource_name,
            self.year,
            tse::NATIONWIDE_MARKER,
            ingestion_date.format(storage::INGESTION_DATE_FORMAT),
            tse::DATA_EXTENSION
        )
    }

    /// `{base}/{subfolder}/{year}` directory for this resource
    pub fn destination_dir(&self, base_path: &Path) -> PathBuf {
        base_path
            .join(&self.destination_subfolder)
            .join(self.year.to_string())
    }
}
