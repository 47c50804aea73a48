use crate::{dna_sequence::Topology, enzymes::Enzymes};
use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpliceSettings {
    /// Default panel only holds enzymes with at least one supplier.
    pub commercial_only: bool,
    /// Default panel drops enzymes with degenerate recognition sites.
    pub remove_ambiguous_enzymes: bool,
    /// Backbone splice enzymes have to cut the insert as well.
    pub restrict_to_shared: bool,
    pub max_map_cut_sites: usize,
    pub backbone_circular: bool,
    pub insert_circular: bool,
    pub enzyme_catalog_path: Option<String>,
    pub table_delimiter: char,
}

impl Default for SpliceSettings {
    fn default() -> Self {
        Self {
            commercial_only: true,
            remove_ambiguous_enzymes: true,
            restrict_to_shared: true,
            max_map_cut_sites: 2,
            backbone_circular: true,
            insert_circular: false,
            enzyme_catalog_path: None,
            table_delimiter: ',',
        }
    }
}

impl SpliceSettings {
    pub fn load_from_path(path: &str) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| anyhow!("Could not read settings file '{path}': {e}"))?;
        serde_json::from_str(&text).map_err(|e| anyhow!("Could not parse settings JSON '{path}': {e}"))
    }

    pub fn save_to_path(&self, path: &str) -> Result<()> {
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path, text).map_err(|e| anyhow!("Could not write settings file '{path}': {e}"))
    }

    pub fn backbone_topology(&self) -> Topology {
        Topology::from_circular(self.backbone_circular)
    }

    pub fn insert_topology(&self) -> Topology {
        Topology::from_circular(self.insert_circular)
    }

    pub fn table_delimiter_byte(&self) -> Result<u8> {
        u8::try_from(self.table_delimiter)
            .ok()
            .filter(|b| b.is_ascii())
            .ok_or_else(|| anyhow!("Table delimiter '{}' is not ASCII", self.table_delimiter))
    }

    /// The configured catalog file, or the bundled one.
    pub fn enzymes(&self) -> Result<Enzymes> {
        match &self.enzyme_catalog_path {
            Some(path) => Enzymes::from_path(path),
            None => Enzymes::builtin(),
        }
    }
}
