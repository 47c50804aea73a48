use crate::iupac_code::IupacCode;
use anyhow::{Result, anyhow};
use bio::io::fasta;
use gb_io::seq::Seq;
use serde::{Deserialize, Serialize};
use std::{fmt, fs::File, path::Path};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Topology {
    #[default]
    Linear,
    Circular,
}

impl Topology {
    pub fn from_circular(is_circular: bool) -> Self {
        match is_circular {
            true => Topology::Circular,
            false => Topology::Linear,
        }
    }
}

impl From<gb_io::seq::Topology> for Topology {
    fn from(topology: gb_io::seq::Topology) -> Self {
        match topology {
            gb_io::seq::Topology::Circular => Topology::Circular,
            gb_io::seq::Topology::Linear => Topology::Linear,
        }
    }
}

impl From<Topology> for gb_io::seq::Topology {
    fn from(topology: Topology) -> Self {
        match topology {
            Topology::Circular => gb_io::seq::Topology::Circular,
            Topology::Linear => gb_io::seq::Topology::Linear,
        }
    }
}

impl fmt::Display for Topology {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Topology::Linear => write!(f, "linear"),
            Topology::Circular => write!(f, "circular"),
        }
    }
}

/// An immutable nucleotide sequence together with its topology.
///
/// Symbols are stored upper-case. Every transformation returns a new value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DNAsequence {
    name: Option<String>,
    seq: Vec<u8>,
    topology: Topology,
}

impl DNAsequence {
    /// Builds a linear sequence, rejecting letters outside the IUPAC alphabet.
    pub fn from_sequence(sequence: &str) -> Result<DNAsequence> {
        let cleaned: Vec<u8> = sequence
            .bytes()
            .filter(|c| !c.is_ascii_whitespace())
            .collect();
        if let Some(bad) = cleaned.iter().find(|c| !IupacCode::is_valid_letter(**c)) {
            return Err(anyhow!("Invalid nucleotide '{}' in sequence", *bad as char));
        }
        Ok(DNAsequence::from_u8(&cleaned))
    }

    pub fn from_fasta_file(filename: &str, topology: Topology) -> Result<Vec<DNAsequence>> {
        let file = File::open(filename)?;
        let mut ret = vec![];
        for record in fasta::Reader::new(file).records() {
            let record = record?;
            ret.push(DNAsequence::from_fasta_record(&record).with_topology(topology));
        }
        Ok(ret)
    }

    /// GenBank records carry their own topology.
    pub fn from_genbank_file(filename: &str) -> Result<Vec<DNAsequence>> {
        Ok(gb_io::reader::parse_file(filename)?
            .into_iter()
            .map(DNAsequence::from_genbank_seq)
            .collect())
    }

    /// Loads the first record of a FASTA or GenBank file, picked by extension.
    /// `topology` applies to FASTA input only.
    pub fn from_file(filename: &str, topology: Topology) -> Result<DNAsequence> {
        let extension = Path::new(filename)
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        let records = match extension.as_str() {
            "gb" | "gbk" | "genbank" => DNAsequence::from_genbank_file(filename)?,
            _ => DNAsequence::from_fasta_file(filename, topology)?,
        };
        records
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("No sequence records in '{filename}'"))
    }

    pub fn write_fasta_file(&self, filename: &str) -> Result<()> {
        let file = File::create(filename)?;
        let mut writer = fasta::Writer::new(file);
        let id = self
            .name
            .clone()
            .unwrap_or_else(|| "sequence".to_string())
            .replace(' ', "_");
        let topology = self.topology.to_string();
        writer.write(&id, Some(&topology), &self.seq)?;
        writer.flush()?;
        Ok(())
    }

    pub fn write_genbank_file(&self, filename: &str) -> Result<()> {
        let file = File::create(filename)?;
        gb_io::writer::write(file, &self.to_genbank_seq())?;
        Ok(())
    }

    fn from_genbank_seq(seq: Seq) -> Self {
        Self {
            name: seq.name.clone(),
            seq: seq.seq.to_ascii_uppercase(),
            topology: seq.topology.clone().into(),
        }
    }

    fn to_genbank_seq(&self) -> Seq {
        Seq {
            name: self.name.clone(),
            topology: self.topology.into(),
            date: None,
            len: Some(self.len()),
            molecule_type: Some("DNA".to_string()),
            division: "SYN".to_string(),
            definition: None,
            accession: None,
            version: None,
            source: None,
            dblink: None,
            keywords: None,
            references: vec![],
            comments: vec![],
            seq: self.seq.clone(),
            contig: None,
            features: vec![],
        }
    }

    fn from_fasta_record(record: &fasta::Record) -> Self {
        let mut ret = Self::from_u8(record.seq());
        ret.name = Some(record.id().to_string());
        ret
    }

    fn from_u8(s: &[u8]) -> Self {
        Self {
            name: None,
            seq: s.to_ascii_uppercase(),
            topology: Topology::Linear,
        }
    }

    pub fn with_topology(mut self, topology: Topology) -> Self {
        self.topology = topology;
        self
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    /// Assembles a new sequence from fragments, in order.
    pub fn from_fragments(fragments: &[&[u8]], topology: Topology) -> Self {
        Self {
            name: None,
            seq: fragments.concat(),
            topology,
        }
    }

    #[inline(always)]
    pub fn forward(&self) -> &[u8] {
        &self.seq
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.seq.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seq.is_empty()
    }

    #[inline(always)]
    pub fn get_base(&self, i: usize) -> Option<u8> {
        if self.is_circular() && !self.is_empty() {
            return Some(self.seq[i % self.len()]);
        }
        self.seq.get(i).copied()
    }

    pub fn name(&self) -> &Option<String> {
        &self.name
    }

    pub fn topology(&self) -> Topology {
        self.topology
    }

    pub fn is_circular(&self) -> bool {
        self.topology == Topology::Circular
    }

    pub fn get_forward_string(&self) -> String {
        String::from_utf8_lossy(&self.seq).to_string()
    }

    pub fn reverse_complement(&self) -> Self {
        Self {
            name: self.name.clone(),
            seq: IupacCode::reverse_complement(&self.seq),
            topology: self.topology,
        }
    }

    /// Whether `needle` occurs in the sequence, wrapping through the origin
    /// of circular sequences.
    pub fn contains(&self, needle: &[u8]) -> bool {
        if needle.is_empty() {
            return true;
        }
        let haystack = if self.is_circular() && needle.len() > 1 {
            let wrap = (needle.len() - 1).min(self.len());
            [self.seq.as_slice(), &self.seq[..wrap]].concat()
        } else {
            self.seq.clone()
        };
        haystack.windows(needle.len()).any(|w| w == needle)
    }
}

impl fmt::Display for DNAsequence {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.seq))
    }
}
