pub mod assembler;
pub mod compatibility;
pub mod cut_sites;
pub mod dna_sequence;
pub mod enzyme_table;
pub mod enzymes;
pub mod error;
pub mod iupac_code;
pub mod logging;
pub mod restriction_enzyme;
pub mod settings;
pub mod site_finder;
