use std::fs;
use std::io;
use std::path::PathBuf;

use reddale_game::{CatalogSource, PolicyCatalog};

pub fn split_csv(s: &str) -> Vec<String> {
    s.split(',')
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

/// Policy catalog read from a JSON file on disk, for balance experiments.
#[derive(Debug, Clone)]
pub struct FileCatalog {
    path: PathBuf,
}

impl FileCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CatalogSource for FileCatalog {
    type Error = io::Error;

    fn load_catalog(&self) -> Result<PolicyCatalog, Self::Error> {
        let json = fs::read_to_string(&self.path)?;
        PolicyCatalog::from_json(&json)
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))
    }
}
