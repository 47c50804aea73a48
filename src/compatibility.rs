use crate::{cut_sites::EnzymeCatalog, error::SpliceError};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompatibilityVerdict {
    pub compatible: bool,
    /// The insert has to go in flipped.
    pub reversed: bool,
    /// Some backbone enzyme has more than one possible partner.
    pub ambiguous: bool,
}

/// End compatibility between backbone and insert enzymes.
///
/// Both candidate lists are in 5' to 3' order on their own sequence. Row `i`
/// belongs to backbone enzyme `i`, column `j` to insert enzyme `j`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompatibilityMatrix {
    backbone: Vec<String>,
    insert: Vec<String>,
    matrix: Array2<bool>,
}

impl CompatibilityMatrix {
    pub fn new<S, F>(backbone: &[S], insert: &[S], compatible: F) -> Self
    where
        S: AsRef<str>,
        F: Fn(&str, &str) -> bool,
    {
        let matrix = Array2::from_shape_fn((backbone.len(), insert.len()), |(i, j)| {
            compatible(backbone[i].as_ref(), insert[j].as_ref())
        });
        Self {
            backbone: backbone.iter().map(|s| s.as_ref().to_string()).collect(),
            insert: insert.iter().map(|s| s.as_ref().to_string()).collect(),
            matrix,
        }
    }

    /// A pair counts as compatible when the catalog accepts it in either
    /// direction.
    pub fn from_catalog<S, C>(backbone: &[S], insert: &[S], catalog: &C) -> Self
    where
        S: AsRef<str>,
        C: EnzymeCatalog + ?Sized,
    {
        Self::new(backbone, insert, |a, b| {
            catalog.compatible_ends(a, b) || catalog.compatible_ends(b, a)
        })
    }

    pub fn backbone(&self) -> &[String] {
        &self.backbone
    }

    pub fn insert(&self) -> &[String] {
        &self.insert
    }

    pub fn get(&self, row: usize, column: usize) -> Option<bool> {
        self.matrix.get((row, column)).copied()
    }

    fn diagonal_len(&self) -> usize {
        self.matrix.nrows().min(self.matrix.ncols())
    }

    /// An empty matrix has no diagonal to match.
    pub fn diagonal(&self) -> bool {
        let k = self.diagonal_len();
        k > 0 && (0..k).all(|i| self.matrix[[i, i]])
    }

    pub fn anti_diagonal(&self) -> bool {
        let k = self.diagonal_len();
        let n = self.matrix.ncols();
        k > 0 && (0..k).all(|i| self.matrix[[i, n - 1 - i]])
    }

    pub fn row_sums(&self) -> Vec<usize> {
        self.matrix
            .rows()
            .into_iter()
            .map(|row| row.iter().filter(|c| **c).count())
            .collect()
    }

    /// Backbone enzymes without any compatible insert enzyme.
    pub fn unassignable(&self) -> Vec<&str> {
        self.row_sums()
            .into_iter()
            .zip(self.backbone.iter())
            .filter(|(sum, _)| *sum == 0)
            .map(|(_, name)| name.as_str())
            .collect()
    }

    pub fn verdict(&self) -> CompatibilityVerdict {
        let diagonal = self.diagonal();
        let anti_diagonal = self.anti_diagonal();
        let ret = CompatibilityVerdict {
            compatible: diagonal || anti_diagonal,
            reversed: anti_diagonal && !diagonal,
            ambiguous: self.row_sums().into_iter().any(|sum| sum > 1),
        };
        debug!(
            backbone = ?self.backbone,
            insert = ?self.insert,
            ?ret,
            "Compatibility verdict"
        );
        ret
    }

    pub fn require_compatible(&self) -> Result<CompatibilityVerdict, SpliceError> {
        let verdict = self.verdict();
        match verdict.compatible {
            true => Ok(verdict),
            false => Err(SpliceError::IncompatibleSelection {
                backbone: self.backbone.clone(),
                insert: self.insert.clone(),
            }),
        }
    }
}
