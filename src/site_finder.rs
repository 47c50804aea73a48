use crate::{
    cut_sites::{CutMap, CutSiteIndex, EnzymePanel, EnzymeSource},
    dna_sequence::DNAsequence,
};
use serde::Serialize;
use std::{collections::BTreeSet, sync::Arc};
use tracing::{debug, warn};

/// Everything derived from one `CutSiteIndex`. Always rebuilt as a whole.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct CutViews {
    index: CutSiteIndex,
    any_cut: CutMap,
    single_cut: CutMap,
}

impl CutViews {
    fn build(index: CutSiteIndex) -> Self {
        let any_cut = index.with_n_cuts(None);
        let single_cut = index.with_n_cuts(Some(1));
        Self {
            index,
            any_cut,
            single_cut,
        }
    }
}

/// The last supplier filter applied to a `SiteFinder`, kept for table export.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SupplierFilter {
    pub codes: BTreeSet<char>,
    pub cut_count: Option<usize>,
    pub enzymes: CutMap,
}

/// One sequence, its cut sites under an enzyme panel, and filtered views of
/// those cut sites.
#[derive(Clone, Debug)]
pub struct SiteFinder {
    sequence: DNAsequence,
    catalog: Arc<dyn EnzymeSource>,
    panel: EnzymePanel,
    views: CutViews,
    supplier_filter: Option<SupplierFilter>,
}

impl SiteFinder {
    pub fn new(sequence: DNAsequence, catalog: Arc<dyn EnzymeSource>, panel: EnzymePanel) -> Self {
        let views = Self::build_views(&sequence, catalog.as_ref(), &panel);
        Self {
            sequence,
            catalog,
            panel,
            views,
            supplier_filter: None,
        }
    }

    fn build_views(sequence: &DNAsequence, catalog: &dyn EnzymeSource, panel: &EnzymePanel) -> CutViews {
        let views = CutViews::build(catalog.locate_cut_sites(sequence, panel));
        debug!(
            panel = panel.len(),
            cutting = views.any_cut.len(),
            single = views.single_cut.len(),
            "Built cut site views"
        );
        views
    }

    /// A finder over another sequence, sharing this one's catalog and panel.
    pub fn for_sequence(&self, sequence: DNAsequence) -> Self {
        Self::new(sequence, self.catalog.clone(), self.panel.clone())
    }

    /// Switches to a new enzyme panel.
    ///
    /// The new views are computed before any field is replaced, and the
    /// cached supplier filter is dropped, since it belonged to the old panel.
    pub fn rebind(&mut self, panel: EnzymePanel) {
        let views = Self::build_views(&self.sequence, self.catalog.as_ref(), &panel);
        self.panel = panel;
        self.views = views;
        self.supplier_filter = None;
    }

    pub fn sequence(&self) -> &DNAsequence {
        &self.sequence
    }

    pub fn catalog(&self) -> &Arc<dyn EnzymeSource> {
        &self.catalog
    }

    pub fn panel(&self) -> &EnzymePanel {
        &self.panel
    }

    pub fn index(&self) -> &CutSiteIndex {
        &self.views.index
    }

    pub fn single_cut_enzymes(&self) -> &CutMap {
        &self.views.single_cut
    }

    pub fn any_cut_enzymes(&self) -> &CutMap {
        &self.views.any_cut
    }

    /// Enzymes cutting exactly `k` times; `None` means every cutting enzyme.
    pub fn n_cut_enzymes(&self, k: Option<usize>) -> CutMap {
        match k {
            None => self.views.any_cut.clone(),
            Some(1) => self.views.single_cut.clone(),
            k => self.views.index.with_n_cuts(k),
        }
    }

    /// `None` for enzymes this finder never searched for.
    pub fn lookup_cut_sites(&self, enzyme: &str) -> Option<&[usize]> {
        self.views.index.get(enzyme)
    }

    /// Cut sites of `enzyme`, empty if it does not cut or is unknown.
    pub fn cut_sites_for(&self, enzyme: &str) -> Vec<usize> {
        match self.lookup_cut_sites(enzyme) {
            Some(positions) => positions.to_vec(),
            None => {
                warn!(enzyme, "Enzyme not found in cut site index");
                vec![]
            }
        }
    }

    pub fn shared_enzymes(
        &self,
        other: &SiteFinder,
        self_k: Option<usize>,
        other_k: Option<usize>,
    ) -> BTreeSet<String> {
        let theirs = other.n_cut_enzymes(other_k);
        self.n_cut_enzymes(self_k)
            .into_keys()
            .filter(|name| theirs.contains_key(name))
            .collect()
    }

    /// Enzymes cutting both sequences exactly once.
    pub fn shared_single_cut_enzymes(&self, other: &SiteFinder) -> BTreeSet<String> {
        self.shared_enzymes(other, Some(1), Some(1))
    }

    fn supplied_by(&self, enzyme: &str, codes: &BTreeSet<char>) -> bool {
        self.catalog
            .metadata(enzyme)
            .map(|meta| meta.suppliers.chars().any(|c| codes.contains(&c)))
            .unwrap_or(false)
    }

    /// Enzymes cutting `k` times that are sold by at least one of `codes`.
    /// The result is also kept as the current supplier filter.
    pub fn filter_by_supplier(&mut self, codes: &BTreeSet<char>, k: Option<usize>) -> CutMap {
        let enzymes: CutMap = self
            .n_cut_enzymes(k)
            .into_iter()
            .filter(|(name, _)| self.supplied_by(name, codes))
            .collect();
        self.supplier_filter = Some(SupplierFilter {
            codes: codes.clone(),
            cut_count: k,
            enzymes: enzymes.clone(),
        });
        enzymes
    }

    pub fn supplier_filter(&self) -> Option<&SupplierFilter> {
        self.supplier_filter.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{dna_sequence::Topology, enzymes::Enzymes};

    const BACKBONE: &str = "ATGTTTAAACTTTCTGAATTCGCTAACGTGTACTA";
    const INSERT: &str = "AATAGTACTAGATGGTTTAAACAGTCTAAGAATTCNNNNNNNNNAACGTTTAGTACTAT";

    fn catalog() -> Arc<dyn EnzymeSource> {
        Arc::new(Enzymes::builtin().unwrap())
    }

    fn panel() -> EnzymePanel {
        EnzymePanel::from_names(["EcoRI", "MaeII", "ScaI", "PmeI", "BamHI", "TaiI"])
    }

    fn backbone() -> SiteFinder {
        let seq = DNAsequence::from_sequence(BACKBONE)
            .unwrap()
            .with_topology(Topology::Circular);
        SiteFinder::new(seq, catalog(), panel())
    }

    fn insert() -> SiteFinder {
        SiteFinder::new(DNAsequence::from_sequence(INSERT).unwrap(), catalog(), panel())
    }

    #[test]
    fn test_views() {
        let finder = insert();
        assert_eq!(finder.cut_sites_for("EcoRI"), vec![31]);
        assert_eq!(finder.cut_sites_for("MaeII"), vec![47]);
        assert_eq!(finder.cut_sites_for("ScaI"), vec![7, 55]);
        assert!(finder.single_cut_enzymes().contains_key("EcoRI"));
        assert!(!finder.single_cut_enzymes().contains_key("ScaI"));
        assert_eq!(
            finder.n_cut_enzymes(Some(2)).keys().collect::<Vec<_>>(),
            vec!["ScaI"]
        );
        assert!(!finder.any_cut_enzymes().contains_key("BamHI"));
        assert_eq!(finder.n_cut_enzymes(None), *finder.any_cut_enzymes());
    }

    #[test]
    fn test_single_cut_matches_index() {
        for finder in [backbone(), insert()] {
            for (name, positions) in finder.index().iter() {
                assert_eq!(
                    positions.len() == 1,
                    finder.single_cut_enzymes().contains_key(name)
                );
            }
        }
    }

    #[test]
    fn test_unknown_enzyme_is_empty() {
        let finder = backbone();
        assert_eq!(finder.lookup_cut_sites("NotI"), None);
        assert_eq!(finder.lookup_cut_sites("BamHI"), Some(&[][..]));
        assert!(finder.cut_sites_for("NotI").is_empty());
        assert!(finder.cut_sites_for("BamHI").is_empty());
    }

    #[test]
    fn test_shared_enzymes() {
        let backbone = backbone();
        let insert = insert();
        let shared = backbone.shared_enzymes(&insert, Some(1), Some(1));
        assert_eq!(
            shared.iter().map(String::as_str).collect::<Vec<_>>(),
            vec!["EcoRI", "MaeII", "PmeI", "TaiI"]
        );
        assert_eq!(shared, insert.shared_enzymes(&backbone, Some(1), Some(1)));
        assert_eq!(shared, backbone.shared_single_cut_enzymes(&insert));
        assert!(backbone.shared_enzymes(&insert, None, Some(2)).is_empty());
    }

    #[test]
    fn test_filter_by_supplier() {
        let mut finder = insert();
        assert!(finder.supplier_filter().is_none());
        let codes = BTreeSet::from(['B']);
        let filtered = finder.filter_by_supplier(&codes, None);
        // MaeII and PmeI are not sold by B
        assert_eq!(
            filtered.keys().collect::<Vec<_>>(),
            vec!["EcoRI", "ScaI", "TaiI"]
        );
        let cached = finder.supplier_filter().unwrap();
        assert_eq!(cached.codes, codes);
        assert_eq!(cached.enzymes, filtered);
        assert!(finder.filter_by_supplier(&BTreeSet::from(['#']), None).is_empty());
    }

    #[test]
    fn test_rebind() {
        let mut finder = insert();
        finder.filter_by_supplier(&BTreeSet::from(['N']), Some(1));
        finder.rebind(EnzymePanel::from_names(["ScaI"]));
        assert!(finder.supplier_filter().is_none());
        assert_eq!(finder.lookup_cut_sites("EcoRI"), None);
        assert!(finder.single_cut_enzymes().is_empty());
        assert_eq!(finder.any_cut_enzymes().len(), 1);
        assert_eq!(finder.panel().len(), 1);
    }

    #[test]
    fn test_for_sequence_keeps_panel() {
        let finder = backbone();
        let other = finder.for_sequence(DNAsequence::from_sequence("GAATTCGGATCC").unwrap());
        assert_eq!(other.panel(), finder.panel());
        assert_eq!(other.cut_sites_for("BamHI"), vec![8]);
    }
}
