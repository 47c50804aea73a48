const DNA_BITMASK_A: u8 = 1;
const DNA_BITMASK_C: u8 = 2;
const DNA_BITMASK_G: u8 = 4;
const DNA_BITMASK_T: u8 = 8;
const DNA_BITMASK_N: u8 = DNA_BITMASK_A | DNA_BITMASK_C | DNA_BITMASK_G | DNA_BITMASK_T;

/// A bitmasked IUPAC code for DNA bases, eg DNA_BITMASK_A|DNA_BITMASK_C
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct IupacCode(u8);

impl IupacCode {
    pub fn new(bitmask: u8) -> Self {
        Self(bitmask)
    }

    #[inline(always)]
    pub fn from_letter(letter: u8) -> Self {
        match letter.to_ascii_uppercase() {
            b'A' => Self(DNA_BITMASK_A),
            b'C' => Self(DNA_BITMASK_C),
            b'G' => Self(DNA_BITMASK_G),
            b'T' | b'U' => Self(DNA_BITMASK_T),
            b'W' => Self(DNA_BITMASK_A | DNA_BITMASK_T),
            b'S' => Self(DNA_BITMASK_C | DNA_BITMASK_G),
            b'M' => Self(DNA_BITMASK_A | DNA_BITMASK_C),
            b'K' => Self(DNA_BITMASK_G | DNA_BITMASK_T),
            b'R' => Self(DNA_BITMASK_A | DNA_BITMASK_G),
            b'Y' => Self(DNA_BITMASK_C | DNA_BITMASK_T),
            b'B' => Self(DNA_BITMASK_C | DNA_BITMASK_G | DNA_BITMASK_T),
            b'D' => Self(DNA_BITMASK_A | DNA_BITMASK_G | DNA_BITMASK_T),
            b'H' => Self(DNA_BITMASK_A | DNA_BITMASK_C | DNA_BITMASK_T),
            b'V' => Self(DNA_BITMASK_A | DNA_BITMASK_C | DNA_BITMASK_G),
            b'N' => Self(DNA_BITMASK_N),
            _ => Self(0),
        }
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// True for A, C, G and T (or U); false for every degenerate code.
    #[inline(always)]
    pub fn is_concrete(&self) -> bool {
        self.0.count_ones() == 1
    }

    #[inline(always)]
    pub fn subset(self, other: Self) -> Self {
        Self(self.0 & other.0)
    }

    /// Whether a recognition letter accepts a sequence letter.
    ///
    /// Every base the sequence letter may stand for has to be allowed by the
    /// recognition letter, so an `N` in a sequence never matches a concrete
    /// recognition base.
    #[inline(always)]
    pub fn accepts(self, sequence_code: Self) -> bool {
        !sequence_code.is_empty() && self.subset(sequence_code) == sequence_code
    }

    #[inline(always)]
    pub fn is_valid_letter(letter: u8) -> bool {
        !Self::from_letter(letter).is_empty()
    }

    #[inline(always)]
    pub fn letter_complement(letter: u8) -> u8 {
        match letter.to_ascii_uppercase() {
            b'A' => b'T',
            b'C' => b'G',
            b'G' => b'C',
            b'T' | b'U' => b'A',
            b'R' => b'Y',
            b'Y' => b'R',
            b'K' => b'M',
            b'M' => b'K',
            b'S' => b'S',
            b'W' => b'W',
            b'B' => b'V',
            b'V' => b'B',
            b'D' => b'H',
            b'H' => b'D',
            _ => b'N',
        }
    }

    pub fn reverse_complement(seq: &[u8]) -> Vec<u8> {
        seq.iter()
            .rev()
            .map(|c| Self::letter_complement(*c))
            .collect()
    }

    pub fn is_fully_specified(seq: &[u8]) -> bool {
        seq.iter().all(|c| Self::from_letter(*c).is_concrete())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base2iupac() {
        assert!(!IupacCode::from_letter(b'V')
            .subset(IupacCode::from_letter(b'G'))
            .is_empty());
        assert!(IupacCode::from_letter(b'H')
            .subset(IupacCode::from_letter(b'G'))
            .is_empty());
        assert_eq!(IupacCode::from_letter(b'A'), IupacCode::new(DNA_BITMASK_A));
        assert_eq!(IupacCode::from_letter(b'u'), IupacCode::new(DNA_BITMASK_T));
        assert_eq!(IupacCode::from_letter(b'X'), IupacCode::new(0));
    }

    #[test]
    fn test_accepts() {
        let n = IupacCode::from_letter(b'N');
        let r = IupacCode::from_letter(b'R');
        let a = IupacCode::from_letter(b'A');
        assert!(n.accepts(a));
        assert!(r.accepts(a));
        assert!(!r.accepts(IupacCode::from_letter(b'C')));
        // A sequence N is not a guaranteed A
        assert!(!a.accepts(n));
        assert!(!a.accepts(IupacCode::from_letter(b'-')));
    }

    #[test]
    fn test_complement() {
        assert_eq!(IupacCode::letter_complement(b'A'), b'T');
        assert_eq!(IupacCode::letter_complement(b'c'), b'G');
        assert_eq!(IupacCode::letter_complement(b'R'), b'Y');
        assert_eq!(IupacCode::letter_complement(b'N'), b'N');
        assert_eq!(IupacCode::letter_complement(b'X'), b'N');
    }

    #[test]
    fn test_reverse_complement() {
        assert_eq!(IupacCode::reverse_complement(b"GAATTC"), b"GAATTC".to_vec());
        assert_eq!(IupacCode::reverse_complement(b"GGTCTC"), b"GAGACC".to_vec());
        assert_eq!(IupacCode::reverse_complement(b"AACN"), b"NGTT".to_vec());
    }

    #[test]
    fn test_fully_specified() {
        assert!(IupacCode::is_fully_specified(b"AATT"));
        assert!(!IupacCode::is_fully_specified(b"ANNT"));
        assert!(IupacCode::is_fully_specified(b""));
    }
}
