use crate::{cut_sites::CutMap, site_finder::SiteFinder};
use anyhow::Result;
use csv::WriterBuilder;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fs::File, io::Write};

/// One exported row per enzyme.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnzymeRecord {
    pub enzyme: String,
    pub cut_count: usize,
    /// Space separated, 1-based.
    pub cut_sites: String,
    pub overhang: String,
    pub commercial: bool,
    pub suppliers: String,
    pub supplier_names: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplierRecord {
    pub code: String,
    pub name: String,
    pub enzyme_count: usize,
    pub enzymes: String,
}

/// Cut sites of one enzyme, for drawing on a sequence map.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnzymeFeature {
    pub enzyme: String,
    pub positions: Vec<usize>,
}

impl SiteFinder {
    pub fn enzyme_records(&self, enzymes: &CutMap) -> Vec<EnzymeRecord> {
        let catalog = self.catalog();
        enzymes
            .iter()
            .map(|(name, positions)| {
                let meta = catalog.metadata(name);
                let suppliers = meta
                    .as_ref()
                    .map(|m| m.suppliers.clone())
                    .unwrap_or_default();
                EnzymeRecord {
                    enzyme: name.to_owned(),
                    cut_count: positions.len(),
                    cut_sites: positions.iter().join(" "),
                    overhang: meta
                        .as_ref()
                        .map(|m| m.overhang.to_string())
                        .unwrap_or_default(),
                    commercial: meta.as_ref().is_some_and(|m| m.is_commercial),
                    supplier_names: suppliers
                        .chars()
                        .filter_map(|c| catalog.supplier_name(c))
                        .join("; "),
                    suppliers,
                }
            })
            .collect()
    }

    /// Rows for enzymes cutting `k` times, every cutting enzyme for `None`.
    pub fn enzyme_table(&self, k: Option<usize>) -> Vec<EnzymeRecord> {
        self.enzyme_records(&self.n_cut_enzymes(k))
    }

    /// Rows for the last supplier filter; empty if none was applied.
    pub fn supplier_filtered_table(&self) -> Vec<EnzymeRecord> {
        self.supplier_filter()
            .map(|filter| self.enzyme_records(&filter.enzymes))
            .unwrap_or_default()
    }

    /// Which cutting enzymes each supplier sells. With a supplier filter
    /// in place only its enzymes and codes are listed.
    pub fn supplier_table(&self) -> Vec<SupplierRecord> {
        let (enzymes, codes) = match self.supplier_filter() {
            Some(filter) => (&filter.enzymes, Some(&filter.codes)),
            None => (self.any_cut_enzymes(), None),
        };
        let catalog = self.catalog();
        let mut by_supplier: BTreeMap<char, Vec<&str>> = BTreeMap::new();
        for name in enzymes.keys() {
            let Some(meta) = catalog.metadata(name) else {
                continue;
            };
            for code in meta.suppliers.chars().unique() {
                if codes.is_none_or(|codes| codes.contains(&code)) {
                    by_supplier.entry(code).or_default().push(name);
                }
            }
        }
        by_supplier
            .into_iter()
            .map(|(code, names)| SupplierRecord {
                code: code.to_string(),
                name: catalog.supplier_name(code).unwrap_or_default(),
                enzyme_count: names.len(),
                enzymes: names.join(" "),
            })
            .collect()
    }

    /// Enzymes with between one and `max_cut_sites` cuts.
    pub fn enzyme_features(&self, max_cut_sites: usize) -> Vec<EnzymeFeature> {
        self.any_cut_enzymes()
            .iter()
            .filter(|(_, positions)| positions.len() <= max_cut_sites)
            .map(|(name, positions)| EnzymeFeature {
                enzyme: name.to_owned(),
                positions: positions.to_owned(),
            })
            .collect()
    }
}

pub fn write_table<W: Write, T: Serialize>(writer: W, rows: &[T], delimiter: u8) -> Result<()> {
    let mut writer = WriterBuilder::new().delimiter(delimiter).from_writer(writer);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn save_enzyme_table(path: &str, rows: &[EnzymeRecord], delimiter: u8) -> Result<()> {
    write_table(File::create(path)?, rows, delimiter)
}

pub fn save_supplier_table(path: &str, rows: &[SupplierRecord], delimiter: u8) -> Result<()> {
    write_table(File::create(path)?, rows, delimiter)
}
