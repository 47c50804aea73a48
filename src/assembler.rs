use crate::{
    compatibility::{CompatibilityMatrix, CompatibilityVerdict},
    cut_sites::CutMap,
    dna_sequence::DNAsequence,
    error::SpliceError,
    iupac_code::IupacCode,
    settings::SpliceSettings,
    site_finder::SiteFinder,
};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeSet, fmt};
use tracing::{debug, info, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SequenceRole {
    Backbone,
    Insert,
}

impl fmt::Display for SequenceRole {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SequenceRole::Backbone => write!(f, "backbone"),
            SequenceRole::Insert => write!(f, "insert"),
        }
    }
}

/// The enzymes cutting at the 5' and the 3' end of a fragment.
///
/// Both names are the same when one enzyme makes both cuts.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnzymePairSelection {
    five_prime: String,
    three_prime: String,
}

impl EnzymePairSelection {
    pub fn new(five_prime: &str, three_prime: &str) -> Self {
        Self {
            five_prime: five_prime.to_string(),
            three_prime: three_prime.to_string(),
        }
    }

    pub fn single(enzyme: &str) -> Self {
        Self::new(enzyme, enzyme)
    }

    /// One name selects a single enzyme for both cuts.
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Result<Self, SpliceError> {
        match names {
            [one] => Ok(Self::single(one.as_ref())),
            [a, b] => Ok(Self::new(a.as_ref(), b.as_ref())),
            other => Err(SpliceError::InvalidEnzymeCount(other.len())),
        }
    }

    pub fn five_prime(&self) -> &str {
        &self.five_prime
    }

    pub fn three_prime(&self) -> &str {
        &self.three_prime
    }

    pub fn is_single_enzyme(&self) -> bool {
        self.five_prime == self.three_prime
    }

    pub fn reversed(&self) -> Self {
        Self::new(&self.three_prime, &self.five_prime)
    }

    pub fn names(&self) -> [&str; 2] {
        [&self.five_prime, &self.three_prime]
    }
}

impl fmt::Display for EnzymePairSelection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/{}", self.five_prime, self.three_prime)
    }
}

/// Where the pieces of a recombinant came from. Offsets are 0-based.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpliceLayout {
    /// Backbone cut offsets in physical order.
    pub backbone_cuts: (usize, usize),
    /// Insert cut offsets in physical order; `[lo, hi)` was kept.
    pub insert_cuts: (usize, usize),
    /// Backbone bases in front of the insert.
    pub backbone_left: usize,
    pub insert_middle: usize,
    /// Backbone bases behind the insert.
    pub backbone_right: usize,
    /// Offset of the first insert base in the recombinant.
    pub insert_start: usize,
    pub backbone_reversed: bool,
    pub insert_reversed: bool,
    /// The insert fragment went in as its reverse complement.
    pub insert_flipped: bool,
}

impl SpliceLayout {
    pub fn total_len(&self) -> usize {
        self.backbone_left + self.insert_middle + self.backbone_right
    }
}

/// One candidate recombinant.
#[derive(Clone, Debug)]
pub struct Integrated {
    pub sequence: DNAsequence,
    pub finder: SiteFinder,
    pub layout: SpliceLayout,
}

#[derive(Clone, Debug)]
pub enum SpliceResult {
    Single(Integrated),
    /// The insert was cut twice by one enzyme, so both orientations are
    /// possible. `reverse` holds the reverse complement of the fragment.
    AmbiguousPair {
        forward: Integrated,
        reverse: Integrated,
    },
}

impl SpliceResult {
    pub fn primary(&self) -> &Integrated {
        match self {
            SpliceResult::Single(integrated) => integrated,
            SpliceResult::AmbiguousPair { forward, .. } => forward,
        }
    }

    pub fn additional(&self) -> Option<&Integrated> {
        match self {
            SpliceResult::Single(_) => None,
            SpliceResult::AmbiguousPair { reverse, .. } => Some(reverse),
        }
    }

    pub fn candidates(&self) -> Vec<&Integrated> {
        std::iter::once(self.primary())
            .chain(self.additional())
            .collect()
    }

    pub fn is_ambiguous(&self) -> bool {
        matches!(self, SpliceResult::AmbiguousPair { .. })
    }
}

/// Physical cut offsets of one side, plus whether the selection named them
/// in descending order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct OrderedCuts {
    lo: usize,
    hi: usize,
    reversed: bool,
}

impl OrderedCuts {
    /// Takes 1-based cut positions as reported by the locator.
    fn from_reported(first: usize, second: usize) -> Self {
        let (a, b) = (first.saturating_sub(1), second.saturating_sub(1));
        Self {
            lo: a.min(b),
            hi: a.max(b),
            reversed: a > b,
        }
    }
}

/// Splices the interior of an insert into a backbone.
#[derive(Clone, Debug)]
pub struct Assembler {
    backbone: SiteFinder,
    insert: SiteFinder,
    settings: SpliceSettings,
    shared_single: BTreeSet<String>,
    backbone_shared_cuts: CutMap,
    insert_shared_cuts: CutMap,
    shared_any: BTreeSet<String>,
    result: Option<SpliceResult>,
}

impl Assembler {
    pub fn new(backbone: SiteFinder, insert: SiteFinder) -> Self {
        Self::with_settings(backbone, insert, SpliceSettings::default())
    }

    pub fn with_settings(backbone: SiteFinder, insert: SiteFinder, settings: SpliceSettings) -> Self {
        let shared_single = backbone.shared_single_cut_enzymes(&insert);
        let restrict = |map: &CutMap| -> CutMap {
            map.iter()
                .filter(|(name, _)| shared_single.contains(*name))
                .map(|(name, positions)| (name.clone(), positions.clone()))
                .collect()
        };
        let backbone_shared_cuts = restrict(backbone.single_cut_enzymes());
        let insert_shared_cuts = restrict(insert.single_cut_enzymes());
        let shared_any = backbone.shared_enzymes(&insert, None, None);
        debug!(
            single = shared_single.len(),
            any = shared_any.len(),
            "Shared enzymes"
        );
        Self {
            backbone,
            insert,
            settings,
            shared_single,
            backbone_shared_cuts,
            insert_shared_cuts,
            shared_any,
            result: None,
        }
    }

    pub fn backbone(&self) -> &SiteFinder {
        &self.backbone
    }

    pub fn insert(&self) -> &SiteFinder {
        &self.insert
    }

    pub fn settings(&self) -> &SpliceSettings {
        &self.settings
    }

    /// Enzymes cutting both sequences exactly once.
    pub fn shared_single(&self) -> &BTreeSet<String> {
        &self.shared_single
    }

    /// Enzymes cutting both sequences at all. Only informative; splicing
    /// never uses this set.
    pub fn shared_any(&self) -> &BTreeSet<String> {
        &self.shared_any
    }

    pub fn backbone_shared_cuts(&self) -> &CutMap {
        &self.backbone_shared_cuts
    }

    pub fn insert_shared_cuts(&self) -> &CutMap {
        &self.insert_shared_cuts
    }

    pub fn result(&self) -> Option<&SpliceResult> {
        self.result.as_ref()
    }

    pub fn integrated_finder(&self) -> Option<&SiteFinder> {
        self.result.as_ref().map(|r| &r.primary().finder)
    }

    pub fn additional_integrated_finder(&self) -> Option<&SiteFinder> {
        self.result
            .as_ref()
            .and_then(|r| r.additional())
            .map(|i| &i.finder)
    }

    pub fn check_compatibility(
        &self,
        backbone: &EnzymePairSelection,
        insert: &EnzymePairSelection,
    ) -> CompatibilityMatrix {
        CompatibilityMatrix::from_catalog(
            &backbone.names(),
            &insert.names(),
            self.backbone.catalog().as_ref(),
        )
    }

    fn ambiguous_cut(&self, enzyme: &str, role: SequenceRole, expected: usize) -> SpliceError {
        let finder = match role {
            SequenceRole::Backbone => &self.backbone,
            SequenceRole::Insert => &self.insert,
        };
        SpliceError::AmbiguousCut {
            enzyme: enzyme.to_string(),
            role,
            found: finder.lookup_cut_sites(enzyme).map_or(0, |p| p.len()),
            expected,
        }
    }

    fn backbone_cut(&self, enzyme: &str) -> Result<usize, SpliceError> {
        let position = self
            .backbone
            .single_cut_enzymes()
            .get(enzyme)
            .and_then(|positions| positions.first().copied())
            .ok_or_else(|| self.ambiguous_cut(enzyme, SequenceRole::Backbone, 1))?;
        if self.settings.restrict_to_shared && !self.insert.any_cut_enzymes().contains_key(enzyme) {
            return Err(self.ambiguous_cut(enzyme, SequenceRole::Insert, 1));
        }
        Ok(position)
    }

    fn insert_single_cut(&self, enzyme: &str) -> Result<usize, SpliceError> {
        self.insert
            .single_cut_enzymes()
            .get(enzyme)
            .and_then(|positions| positions.first().copied())
            .ok_or_else(|| self.ambiguous_cut(enzyme, SequenceRole::Insert, 1))
    }

    fn insert_double_cut(&self, enzyme: &str) -> Result<(usize, usize), SpliceError> {
        match self.insert.n_cut_enzymes(Some(2)).get(enzyme).map(Vec::as_slice) {
            Some([a, b]) => Ok((*a, *b)),
            _ => Err(self.ambiguous_cut(enzyme, SequenceRole::Insert, 2)),
        }
    }

    /// Backbone pieces going in front of and behind the insert.
    ///
    /// Ascending cuts drop `[lo, hi)`. Descending cuts keep `[lo, hi)` on a
    /// circular backbone and drop the piece across the origin; on a linear
    /// backbone the two outer pieces trade places.
    fn backbone_pieces(&self, cuts: OrderedCuts) -> (&[u8], &[u8]) {
        let bb = self.backbone.sequence().forward();
        let none: &[u8] = &[];
        match (cuts.reversed, self.backbone.sequence().is_circular()) {
            (false, _) => (&bb[..cuts.lo], &bb[cuts.hi..]),
            (true, true) => (&bb[cuts.lo..cuts.hi], none),
            (true, false) => (&bb[cuts.hi..], &bb[..cuts.lo]),
        }
    }

    fn build_candidate(&self, backbone: OrderedCuts, insert: OrderedCuts, flip: bool) -> Integrated {
        let (left, right) = self.backbone_pieces(backbone);
        let middle = &self.insert.sequence().forward()[insert.lo..insert.hi];
        let middle = match flip {
            true => IupacCode::reverse_complement(middle),
            false => middle.to_vec(),
        };
        let sequence = DNAsequence::from_fragments(
            &[left, middle.as_slice(), right],
            self.backbone.sequence().topology(),
        )
        .with_name(&self.recombinant_name());
        let layout = SpliceLayout {
            backbone_cuts: (backbone.lo, backbone.hi),
            insert_cuts: (insert.lo, insert.hi),
            backbone_left: left.len(),
            insert_middle: middle.len(),
            backbone_right: right.len(),
            insert_start: left.len(),
            backbone_reversed: backbone.reversed,
            insert_reversed: insert.reversed,
            insert_flipped: flip,
        };
        debug!(?layout, "Built recombinant");
        let finder = self.backbone.for_sequence(sequence.clone());
        Integrated {
            sequence,
            finder,
            layout,
        }
    }

    fn recombinant_name(&self) -> String {
        let name = |finder: &SiteFinder, fallback: &str| {
            finder
                .sequence()
                .name()
                .clone()
                .unwrap_or_else(|| fallback.to_string())
        };
        format!(
            "{}_{}",
            name(&self.backbone, "backbone"),
            name(&self.insert, "insert")
        )
    }

    /// Builds the recombinant(s) for the given selections without storing
    /// them.
    ///
    /// The insert keeps only the fragment between its two cuts. The backbone
    /// end of the first named enzyme goes in front of the insert, the end of
    /// the second one behind it, so naming the backbone cuts in descending
    /// physical order swaps which backbone pieces are kept. An insert named in
    /// descending order goes in as its reverse complement.
    pub fn splice(
        &self,
        backbone: &EnzymePairSelection,
        insert: &EnzymePairSelection,
    ) -> Result<SpliceResult, SpliceError> {
        let backbone_cuts = OrderedCuts::from_reported(
            self.backbone_cut(backbone.five_prime())?,
            self.backbone_cut(backbone.three_prime())?,
        );

        if insert.is_single_enzyme() {
            let (a, b) = self.insert_double_cut(insert.five_prime())?;
            let insert_cuts = OrderedCuts::from_reported(a, b);
            warn!(
                enzyme = insert.five_prime(),
                "Insert is cut twice by one enzyme, orientation is ambiguous"
            );
            let forward = self.build_candidate(backbone_cuts, insert_cuts, false);
            let reverse = self.build_candidate(backbone_cuts, insert_cuts, true);
            return Ok(SpliceResult::AmbiguousPair { forward, reverse });
        }

        let insert_cuts = OrderedCuts::from_reported(
            self.insert_single_cut(insert.five_prime())?,
            self.insert_single_cut(insert.three_prime())?,
        );
        if insert_cuts.lo == insert_cuts.hi {
            warn!(%insert, "Insert enzymes cut at the same position, the fragment is empty");
        }
        Ok(SpliceResult::Single(self.build_candidate(
            backbone_cuts,
            insert_cuts,
            insert_cuts.reversed,
        )))
    }

    /// Splices and keeps the result for `integrated_finder`.
    pub fn integrate(
        &mut self,
        backbone: &EnzymePairSelection,
        insert: &EnzymePairSelection,
    ) -> Result<&SpliceResult, SpliceError> {
        let result = self.splice(backbone, insert)?;
        info!(
            %backbone,
            %insert,
            length = result.primary().sequence.len(),
            candidates = result.candidates().len(),
            "Spliced insert into backbone"
        );
        let result: &SpliceResult = self.result.insert(result);
        Ok(result)
    }

    /// Checks end compatibility first and turns the insert selection around
    /// when only the reversed pairing ligates.
    pub fn integrate_oriented(
        &mut self,
        backbone: &EnzymePairSelection,
        insert: &EnzymePairSelection,
    ) -> Result<(CompatibilityVerdict, &SpliceResult), SpliceError> {
        let verdict = self
            .check_compatibility(backbone, insert)
            .require_compatible()?;
        if verdict.ambiguous {
            warn!(%backbone, %insert, "More than one compatible pairing");
        }
        let insert = match verdict.reversed {
            true => insert.reversed(),
            false => insert.clone(),
        };
        let result = self.integrate(backbone, &insert)?;
        Ok((verdict, result))
    }
}
