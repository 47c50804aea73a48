use crate::{dna_sequence::DNAsequence, restriction_enzyme::Overhang};
use serde::{Deserialize, Serialize};
use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
};

/// Enzyme name -> ascending, unique, 1-based cut positions.
pub type CutMap = BTreeMap<String, Vec<usize>>;

/// A named selection of enzymes to search for.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnzymePanel {
    names: BTreeSet<String>,
}

impl EnzymePanel {
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Cut positions per enzyme for exactly one sequence.
///
/// Enzymes that were searched for but do not cut are kept with an empty list,
/// so "searched, zero sites" and "never searched" stay distinguishable here.
/// Views built on top of the index treat both the same.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CutSiteIndex {
    sites: CutMap,
}

impl CutSiteIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, enzyme: &str, mut positions: Vec<usize>) {
        positions.sort_unstable();
        positions.dedup();
        self.sites.insert(enzyme.to_string(), positions);
    }

    pub fn get(&self, enzyme: &str) -> Option<&[usize]> {
        self.sites.get(enzyme).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<usize>)> {
        self.sites.iter()
    }

    /// Enzymes cutting exactly `k` times, or at least once for `None`.
    pub fn with_n_cuts(&self, k: Option<usize>) -> CutMap {
        self.sites
            .iter()
            .filter(|(_, positions)| match k {
                Some(k) => positions.len() == k,
                None => !positions.is_empty(),
            })
            .map(|(name, positions)| (name.clone(), positions.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }
}

impl FromIterator<(String, Vec<usize>)> for CutSiteIndex {
    fn from_iter<T: IntoIterator<Item = (String, Vec<usize>)>>(iter: T) -> Self {
        let mut ret = Self::new();
        for (name, positions) in iter {
            ret.insert(&name, positions);
        }
        ret
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnzymeMetadata {
    pub name: String,
    pub overhang: Overhang,
    pub suppliers: String,
    pub is_commercial: bool,
}

/// Read-only enzyme metadata.
pub trait EnzymeCatalog {
    fn metadata(&self, enzyme: &str) -> Option<EnzymeMetadata>;

    /// Whether a cut by `a` leaves an end that ligates to a cut by `b`.
    /// Implementations are not required to be symmetric.
    fn compatible_ends(&self, a: &str, b: &str) -> bool;

    fn supplier_name(&self, _code: char) -> Option<String> {
        None
    }
}

/// Produces the cut positions of a panel of enzymes in one sequence.
pub trait CutSiteLocator {
    fn locate_cut_sites(&self, seq: &DNAsequence, panel: &EnzymePanel) -> CutSiteIndex;
}

/// Everything a `SiteFinder` needs from the outside world.
pub trait EnzymeSource: EnzymeCatalog + CutSiteLocator + fmt::Debug + Send + Sync {}

impl<T: EnzymeCatalog + CutSiteLocator + fmt::Debug + Send + Sync> EnzymeSource for T {}

#[cfg(test)]
mod tests {
    use super::*;

    fn index() -> CutSiteIndex {
        vec![
            ("EcoRI".to_string(), vec![17]),
            ("XbaI".to_string(), vec![40, 12, 12]),
            ("PstI".to_string(), vec![]),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_insert_sorts_and_dedups() {
        assert_eq!(index().get("XbaI"), Some(&[12, 40][..]));
    }

    #[test]
    fn test_with_n_cuts() {
        let index = index();
        assert_eq!(index.with_n_cuts(Some(1)).keys().collect::<Vec<_>>(), vec!["EcoRI"]);
        assert_eq!(index.with_n_cuts(Some(2)).keys().collect::<Vec<_>>(), vec!["XbaI"]);
        assert_eq!(index.with_n_cuts(None).len(), 2);
        assert!(index.with_n_cuts(Some(0)).contains_key("PstI"));
    }

    #[test]
    fn test_unknown_versus_empty() {
        let index = index();
        assert_eq!(index.get("PstI"), Some(&[][..]));
        assert_eq!(index.get("NotI"), None);
    }

    #[test]
    fn test_panel() {
        let panel = EnzymePanel::from_names(["XbaI", "EcoRI", "XbaI"]);
        assert_eq!(panel.len(), 2);
        assert_eq!(panel.names().collect::<Vec<_>>(), vec!["EcoRI", "XbaI"]);
        assert!(panel.contains("EcoRI"));
        assert!(!EnzymePanel::default().contains("EcoRI"));
    }
}
