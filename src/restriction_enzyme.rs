use crate::{dna_sequence::DNAsequence, iupac_code::IupacCode};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RestrictionEnzyme {
    pub name: String,
    /// Recognition site, 5'->3', IUPAC letters.
    pub sequence: String,
    pub note: Option<String>,
    /// Top-strand cut, counted from the first base of the recognition site.
    pub cut: isize,
    /// Overhang length: positive for 5' overhangs, negative for 3', zero for blunt.
    pub overlap: isize,
    /// Supplier codes, one letter each.
    #[serde(default)]
    pub suppliers: String,
    #[serde(skip_serializing, default)]
    is_palindromic: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Overhang {
    FivePrime(String),
    ThreePrime(String),
    Blunt,
}

impl Overhang {
    pub fn kind(&self) -> &'static str {
        match self {
            Overhang::FivePrime(_) => "5' overhang",
            Overhang::ThreePrime(_) => "3' overhang",
            Overhang::Blunt => "blunt",
        }
    }

    pub fn sequence(&self) -> &str {
        match self {
            Overhang::FivePrime(s) | Overhang::ThreePrime(s) => s,
            Overhang::Blunt => "",
        }
    }

    /// Whether two ends can be ligated to each other.
    ///
    /// Sticky ends have to agree in type and carry the same, fully specified
    /// bases. Blunt ends ligate to any blunt end.
    pub fn ligates_with(&self, other: &Overhang) -> bool {
        match (self, other) {
            (Overhang::Blunt, Overhang::Blunt) => true,
            (Overhang::FivePrime(a), Overhang::FivePrime(b))
            | (Overhang::ThreePrime(a), Overhang::ThreePrime(b)) => {
                a == b && IupacCode::is_fully_specified(a.as_bytes())
            }
            _ => false,
        }
    }
}

impl fmt::Display for Overhang {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Overhang::Blunt => write!(f, "blunt"),
            other => write!(f, "{} {}", other.kind(), other.sequence()),
        }
    }
}

impl RestrictionEnzyme {
    pub fn new(name: &str, sequence: &str, cut: isize, overlap: isize, suppliers: &str) -> Self {
        let mut ret = Self {
            name: name.to_string(),
            sequence: sequence.to_ascii_uppercase(),
            note: None,
            cut,
            overlap,
            suppliers: suppliers.to_string(),
            is_palindromic: false,
        };
        ret.check_palindromic();
        ret
    }

    pub fn check_palindromic(&mut self) {
        self.sequence = self.sequence.to_ascii_uppercase();
        self.is_palindromic = self.sequence.as_bytes() == self.get_sequence_rc().as_slice();
    }

    pub fn is_palindromic(&self) -> bool {
        self.is_palindromic
    }

    /// Recognition sites with degenerate letters (eg `RGATCY`).
    pub fn is_ambiguous(&self) -> bool {
        !IupacCode::is_fully_specified(self.sequence.as_bytes())
    }

    pub fn is_commercial(&self) -> bool {
        !self.suppliers.is_empty()
    }

    pub fn supplier_codes(&self) -> impl Iterator<Item = char> + '_ {
        self.suppliers.chars()
    }

    fn get_sequence_rc(&self) -> Vec<u8> {
        IupacCode::reverse_complement(self.sequence.as_bytes())
    }

    /// The single-stranded end left behind by a cut.
    ///
    /// Bases outside the recognition site (type IIS enzymes) are unknown and
    /// reported as `N`.
    pub fn overhang(&self) -> Overhang {
        let (from, to) = match self.overlap {
            0 => return Overhang::Blunt,
            o if o > 0 => (self.cut, self.cut + o),
            o => (self.cut + o, self.cut),
        };
        let site = self.sequence.as_bytes();
        let bases: String = (from..to)
            .map(|i| {
                usize::try_from(i)
                    .ok()
                    .and_then(|i| site.get(i))
                    .map(|c| *c as char)
                    .unwrap_or('N')
            })
            .collect();
        if self.overlap > 0 {
            Overhang::FivePrime(bases)
        } else {
            Overhang::ThreePrime(bases)
        }
    }

    fn site_matches(seq: &DNAsequence, start: usize, site: &[u8]) -> bool {
        site.iter().enumerate().all(|(i, code)| {
            seq.get_base(start + i)
                .map(|base| IupacCode::from_letter(*code).accepts(IupacCode::from_letter(base)))
                .unwrap_or(false)
        })
    }

    /// Top-strand cut positions in `seq`, ascending and unique.
    ///
    /// Positions are 1-based: the first base 3' of the cut. Circular
    /// sequences report positions in `[1, len]`; on linear sequences a cut
    /// has to fall strictly inside the molecule.
    pub fn cut_positions(&self, seq: &DNAsequence) -> Vec<usize> {
        let site = self.sequence.as_bytes();
        let site_rc = self.get_sequence_rc();
        let recognition_len = site.len();
        let seq_len = seq.len();
        if recognition_len == 0 || seq_len < recognition_len {
            return vec![];
        }
        let last_start = if seq.is_circular() {
            seq_len
        } else {
            seq_len - recognition_len + 1
        };

        let mut cuts: Vec<isize> = vec![];
        for start in 0..last_start {
            if Self::site_matches(seq, start, site) {
                cuts.push(start as isize + self.cut);
            }
            if !self.is_palindromic && Self::site_matches(seq, start, &site_rc) {
                // Bottom-strand cut of the site, read from the top strand
                cuts.push(start as isize + recognition_len as isize - (self.cut + self.overlap));
            }
        }

        let len = seq_len as isize;
        let mut ret: Vec<usize> = cuts
            .into_iter()
            .filter_map(|cut| match seq.is_circular() {
                true => Some(cut.rem_euclid(len) as usize + 1),
                false if cut > 0 && cut < len => Some(cut as usize + 1),
                false => None,
            })
            .collect();
        ret.sort_unstable();
        ret.dedup();
        ret
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dna_sequence::Topology;

    fn eco_ri() -> RestrictionEnzyme {
        RestrictionEnzyme::new("EcoRI", "GAATTC", 1, 4, "BN")
    }

    #[test]
    fn test_restriction_enzyme() {
        let re = eco_ri();
        assert!(re.is_palindromic());
        assert!(!re.is_ambiguous());
        assert_eq!(re.overhang(), Overhang::FivePrime("AATT".to_string()));
        let seq = DNAsequence::from_sequence("AAAGAATTCAAA").unwrap();
        // Cut between G and AATTC, reported as the 1-based position of the first A
        assert_eq!(re.cut_positions(&seq), vec![5]);
    }

    #[test]
    fn test_restriction_enzyme_sites() {
        let seq = DNAsequence::from_sequence("AGAATTCGAATTCA").unwrap();
        assert_eq!(eco_ri().cut_positions(&seq), vec![3, 9]);
    }

    #[test]
    fn test_cut_at_linear_end_is_dropped() {
        let sau3ai = RestrictionEnzyme::new("Sau3AI", "GATC", 0, 4, "N");
        let seq = DNAsequence::from_sequence("GATCAAGATCAA").unwrap();
        assert_eq!(sau3ai.cut_positions(&seq), vec![7]);
        let seq = seq.with_topology(Topology::Circular);
        assert_eq!(sau3ai.cut_positions(&seq), vec![1, 7]);
    }

    #[test]
    fn test_circular_site_across_origin() {
        let seq = DNAsequence::from_sequence("TTCAAAAGAA").unwrap();
        assert!(eco_ri().cut_positions(&seq).is_empty());
        let seq = seq.with_topology(Topology::Circular);
        // G at index 7, cut before index 8
        assert_eq!(eco_ri().cut_positions(&seq), vec![9]);
    }

    #[test]
    fn test_sequence_n_does_not_match() {
        let seq = DNAsequence::from_sequence("AAGANTTCAA").unwrap();
        assert!(eco_ri().cut_positions(&seq).is_empty());
    }

    #[test]
    fn test_degenerate_site() {
        let bst_yi = RestrictionEnzyme::new("BstYI", "RGATCY", 1, 4, "N");
        assert!(bst_yi.is_ambiguous());
        assert!(bst_yi.is_palindromic());
        let seq = DNAsequence::from_sequence("AAGGATCCAAAGATCTAA").unwrap();
        assert_eq!(bst_yi.cut_positions(&seq), vec![4, 12]);
    }

    #[test]
    fn test_non_palindromic_reverse_strand() {
        // GGTCTC(1/5)
        let bsa_i = RestrictionEnzyme::new("BsaI", "GGTCTC", 7, 4, "N");
        assert!(!bsa_i.is_palindromic());
        assert_eq!(bsa_i.overhang(), Overhang::FivePrime("NNNN".to_string()));
        let forward = DNAsequence::from_sequence("AGGTCTCAAAAAAAA").unwrap();
        assert_eq!(bsa_i.cut_positions(&forward), vec![9]);
        let reverse = forward.reverse_complement();
        // GAGACC at 8, the bottom-strand cut lands 5 bases upstream of it
        assert_eq!(bsa_i.cut_positions(&reverse), vec![4]);
    }

    #[test]
    fn test_three_prime_overhang() {
        let kpn_i = RestrictionEnzyme::new("KpnI", "GGTACC", 5, -4, "BN");
        assert_eq!(kpn_i.overhang(), Overhang::ThreePrime("GTAC".to_string()));
        let acc65_i = RestrictionEnzyme::new("Acc65I", "GGTACC", 1, 4, "BN");
        assert!(!kpn_i.overhang().ligates_with(&acc65_i.overhang()));
        assert!(kpn_i.overhang().ligates_with(&kpn_i.overhang()));
    }

    #[test]
    fn test_blunt_ends_ligate() {
        let eco_rv = RestrictionEnzyme::new("EcoRV", "GATATC", 3, 0, "BN");
        let pme_i = RestrictionEnzyme::new("PmeI", "GTTTAAAC", 4, 0, "N");
        assert!(eco_rv.overhang().ligates_with(&pme_i.overhang()));
        assert!(!eco_rv.overhang().ligates_with(&eco_ri().overhang()));
        assert_eq!(eco_rv.overhang().to_string(), "blunt");
    }
}
