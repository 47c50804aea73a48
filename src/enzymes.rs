use crate::{
    cut_sites::{CutSiteIndex, CutSiteLocator, EnzymeCatalog, EnzymeMetadata, EnzymePanel},
    dna_sequence::DNAsequence,
    error::SpliceError,
    restriction_enzyme::RestrictionEnzyme,
    settings::SpliceSettings,
};
use anyhow::{Result, anyhow};
use serde::Deserialize;
use std::{
    collections::{BTreeMap, HashMap},
    fs,
};
use tracing::{debug, warn};

const BUILTIN_ENZYMES_JSON: &str = include_str!("../assets/enzymes.json");

#[derive(Clone, Debug, Deserialize)]
struct Supplier {
    code: char,
    name: String,
}

/// Restriction enzymes and suppliers, read-only once loaded.
#[derive(Clone, Debug, Default)]
pub struct Enzymes {
    restriction_enzymes: Vec<RestrictionEnzyme>,
    by_name: HashMap<String, usize>,
    suppliers: BTreeMap<char, String>,
    max_re_length: usize,
}

impl Enzymes {
    pub fn from_json_text(json_text: &str) -> Result<Self> {
        let mut ret = Self::default();
        let res: serde_json::Value = serde_json::from_str(json_text)?;
        let arr = res
            .as_array()
            .ok_or(anyhow!("Enzymes file is not a JSON array"))?;
        for row in arr {
            match row.get("type").and_then(|t| t.as_str()) {
                Some("restriction") => {
                    let mut re: RestrictionEnzyme = serde_json::from_value(row.clone())
                        .map_err(|e| anyhow!("Bad restriction enzyme: {row}: {e}"))?;
                    re.check_palindromic();
                    ret.add_restriction_enzyme(re)?;
                }
                Some("supplier") => {
                    let supplier: Supplier = serde_json::from_value(row.clone())
                        .map_err(|e| anyhow!("Bad supplier: {row}: {e}"))?;
                    ret.suppliers.insert(supplier.code, supplier.name);
                }
                Some(other) => return Err(anyhow!("Unknown enzyme type '{other}' in {row}")),
                None => return Err(anyhow!("Missing enzyme type for {row}")),
            }
        }
        debug!(
            enzymes = ret.restriction_enzymes.len(),
            suppliers = ret.suppliers.len(),
            "Loaded enzyme catalog"
        );
        Ok(ret)
    }

    pub fn from_path(path: &str) -> Result<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| anyhow!("Could not read enzyme catalog '{path}': {e}"))?;
        Self::from_json_text(&text)
    }

    /// The catalog compiled into the crate.
    pub fn builtin() -> Result<Self> {
        Self::from_json_text(BUILTIN_ENZYMES_JSON)
    }

    fn add_restriction_enzyme(&mut self, re: RestrictionEnzyme) -> Result<()> {
        if self.by_name.contains_key(&re.name) {
            return Err(anyhow!("Duplicate restriction enzyme '{}'", re.name));
        }
        self.max_re_length = self.max_re_length.max(re.sequence.len());
        self.by_name
            .insert(re.name.clone(), self.restriction_enzymes.len());
        self.restriction_enzymes.push(re);
        Ok(())
    }

    pub fn restriction_enzymes(&self) -> &[RestrictionEnzyme] {
        &self.restriction_enzymes
    }

    pub fn get(&self, name: &str) -> Option<&RestrictionEnzyme> {
        self.by_name
            .get(name)
            .and_then(|id| self.restriction_enzymes.get(*id))
    }

    pub fn suppliers(&self) -> &BTreeMap<char, String> {
        &self.suppliers
    }

    pub fn max_re_length(&self) -> usize {
        self.max_re_length
    }

    pub fn full_panel(&self) -> EnzymePanel {
        EnzymePanel::from_names(self.restriction_enzymes.iter().map(|re| re.name.as_str()))
    }

    pub fn commercial_panel(&self) -> EnzymePanel {
        EnzymePanel::from_names(
            self.restriction_enzymes
                .iter()
                .filter(|re| re.is_commercial())
                .map(|re| re.name.as_str()),
        )
    }

    /// The default panel under the given settings.
    pub fn panel_for(&self, settings: &SpliceSettings) -> Result<EnzymePanel, SpliceError> {
        let panel = EnzymePanel::from_names(
            self.restriction_enzymes
                .iter()
                .filter(|re| !settings.commercial_only || re.is_commercial())
                .filter(|re| !settings.remove_ambiguous_enzymes || !re.is_ambiguous())
                .map(|re| re.name.as_str()),
        );
        match panel.is_empty() {
            true => Err(SpliceError::EmptyPanel),
            false => Ok(panel),
        }
    }
}

impl EnzymeCatalog for Enzymes {
    fn metadata(&self, enzyme: &str) -> Option<EnzymeMetadata> {
        self.get(enzyme).map(|re| EnzymeMetadata {
            name: re.name.clone(),
            overhang: re.overhang(),
            suppliers: re.suppliers.clone(),
            is_commercial: re.is_commercial(),
        })
    }

    fn compatible_ends(&self, a: &str, b: &str) -> bool {
        match (self.get(a), self.get(b)) {
            (Some(a), Some(b)) => a.overhang().ligates_with(&b.overhang()),
            _ => false,
        }
    }

    fn supplier_name(&self, code: char) -> Option<String> {
        self.suppliers.get(&code).cloned()
    }
}

impl CutSiteLocator for Enzymes {
    fn locate_cut_sites(&self, seq: &DNAsequence, panel: &EnzymePanel) -> CutSiteIndex {
        let mut ret = CutSiteIndex::new();
        for name in panel.names() {
            match self.get(name) {
                Some(re) => ret.insert(name, re.cut_positions(seq)),
                None => warn!(enzyme = name, "Enzyme is not in the catalog, skipping"),
            }
        }
        ret
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{dna_sequence::Topology, restriction_enzyme::Overhang};

    #[test]
    fn test_builtin_catalog() {
        let enzymes = Enzymes::builtin().unwrap();
        let eco_ri = enzymes.get("EcoRI").unwrap();
        assert_eq!(eco_ri.sequence, "GAATTC");
        assert!(eco_ri.is_palindromic());
        assert!(enzymes.get("Foo").is_none());
        assert_eq!(enzymes.max_re_length(), 8);
        assert_eq!(
            enzymes.supplier_name('N'),
            Some("New England Biolabs".to_string())
        );
        assert_eq!(enzymes.supplier_name('#'), None);
    }

    #[test]
    fn test_metadata() {
        let enzymes = Enzymes::builtin().unwrap();
        let meta = enzymes.metadata("PstI").unwrap();
        assert_eq!(meta.overhang, Overhang::ThreePrime("TGCA".to_string()));
        assert!(meta.is_commercial);
        assert!(!enzymes.metadata("BspLU11I").unwrap().is_commercial);
        assert!(enzymes.metadata("Foo").is_none());
    }

    #[test]
    fn test_compatible_ends() {
        let enzymes = Enzymes::builtin().unwrap();
        assert!(enzymes.compatible_ends("BamHI", "BglII"));
        assert!(enzymes.compatible_ends("EcoRI", "MfeI"));
        assert!(enzymes.compatible_ends("XbaI", "SpeI"));
        assert!(enzymes.compatible_ends("EcoRV", "ScaI"));
        assert!(!enzymes.compatible_ends("EcoRI", "BamHI"));
        assert!(!enzymes.compatible_ends("KpnI", "Acc65I"));
        assert!(!enzymes.compatible_ends("BsaI", "BsaI"));
        assert!(!enzymes.compatible_ends("EcoRI", "Foo"));
    }

    #[test]
    fn test_panels() {
        let enzymes = Enzymes::builtin().unwrap();
        let full = enzymes.full_panel();
        assert_eq!(full.len(), enzymes.restriction_enzymes().len());
        let commercial = enzymes.commercial_panel();
        assert!(full.contains("BspLU11I"));
        assert!(!commercial.contains("BspLU11I"));
        let default = enzymes.panel_for(&SpliceSettings::default()).unwrap();
        assert!(default.contains("EcoRI"));
        assert!(!default.contains("BstYI"));
        assert!(!default.contains("BspLU11I"));
        let everything = SpliceSettings {
            commercial_only: false,
            remove_ambiguous_enzymes: false,
            ..Default::default()
        };
        assert_eq!(enzymes.panel_for(&everything).unwrap(), full);
    }

    #[test]
    fn test_empty_panel() {
        let enzymes = Enzymes::from_json_text(
            r#"[{"type":"restriction","name":"Foo","sequence":"GANTC","cut":1,"overlap":3}]"#,
        )
        .unwrap();
        assert_eq!(
            enzymes.panel_for(&SpliceSettings::default()),
            Err(SpliceError::EmptyPanel)
        );
    }

    #[test]
    fn test_bad_catalogs() {
        assert!(Enzymes::from_json_text("{}").is_err());
        assert!(Enzymes::from_json_text(r#"[{"name":"EcoRI"}]"#).is_err());
        assert!(Enzymes::from_json_text(r#"[{"type":"protease","name":"TEV"}]"#).is_err());
        let twice = r#"[
            {"type":"restriction","name":"EcoRI","sequence":"GAATTC","cut":1,"overlap":4},
            {"type":"restriction","name":"EcoRI","sequence":"GAATTC","cut":1,"overlap":4}
        ]"#;
        assert!(Enzymes::from_json_text(twice).is_err());
    }

    #[test]
    fn test_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("enzymes.json");
        std::fs::write(
            &path,
            r#"[{"type":"restriction","name":"EcoRI","sequence":"gaattc","cut":1,"overlap":4,"suppliers":"B"}]"#,
        )
        .unwrap();
        let enzymes = Enzymes::from_path(&path.to_string_lossy()).unwrap();
        assert_eq!(enzymes.get("EcoRI").unwrap().sequence, "GAATTC");
        assert!(Enzymes::from_path("/nonexistent/enzymes.json").is_err());
    }

    #[test]
    fn test_locate_cut_sites() {
        let enzymes = Enzymes::builtin().unwrap();
        let seq = DNAsequence::from_sequence("GAATTCAAAGGATCCAAAGAATTC")
            .unwrap()
            .with_topology(Topology::Circular);
        let panel = EnzymePanel::from_names(["EcoRI", "BamHI", "PstI", "Foo"]);
        let index = enzymes.locate_cut_sites(&seq, &panel);
        assert_eq!(index.get("EcoRI"), Some(&[2, 20][..]));
        assert_eq!(index.get("BamHI"), Some(&[11][..]));
        assert_eq!(index.get("PstI"), Some(&[][..]));
        assert_eq!(index.get("Foo"), None);
    }
}
