use gentle_splice::{
    assembler::{Assembler, EnzymePairSelection, SpliceLayout},
    compatibility::{CompatibilityMatrix, CompatibilityVerdict},
    cut_sites::{CutMap, EnzymePanel, EnzymeSource},
    dna_sequence::{DNAsequence, Topology},
    enzyme_table::{EnzymeFeature, save_enzyme_table, save_supplier_table},
    logging::init_logging,
    settings::SpliceSettings,
    site_finder::SiteFinder,
};
use serde::Serialize;
use std::{collections::BTreeSet, env, path::Path, sync::Arc};

#[derive(Serialize)]
struct SharedSummary {
    shared_single: BTreeSet<String>,
    shared_any: BTreeSet<String>,
    backbone_cuts: CutMap,
    insert_cuts: CutMap,
}

#[derive(Serialize)]
struct CheckSummary {
    verdict: CompatibilityVerdict,
    row_sums: Vec<usize>,
    unassignable: Vec<String>,
}

#[derive(Serialize)]
struct CandidateSummary {
    path: String,
    length: usize,
    circular: bool,
    layout: SpliceLayout,
    single_cut: Vec<String>,
}

#[derive(Serialize)]
struct MapSummary {
    name: Option<String>,
    length: usize,
    circular: bool,
    features: Vec<EnzymeFeature>,
}

fn usage() {
    eprintln!(
        "Usage:\n  \
  gentle_splice --version\n  \
  gentle_splice [--settings PATH] shared BACKBONE INSERT\n  \
  gentle_splice [--settings PATH] check BACKBONE_ENZYMES INSERT_ENZYMES\n  \
  gentle_splice [--settings PATH] integrate BACKBONE INSERT BACKBONE_ENZYMES INSERT_ENZYMES OUTPUT [--oriented]\n  \
  gentle_splice [--settings PATH] table SEQUENCE OUTPUT [--cuts K] [--suppliers CODES] [--by-supplier]\n  \
  gentle_splice [--settings PATH] map SEQUENCE\n\n  \
  Enzymes are given as NAME or NAME,NAME; sequences as FASTA or GenBank.\n  \
  Set RUST_LOG=info for progress messages"
    );
}

fn print_json<T: Serialize>(value: &T) -> Result<(), String> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| format!("Could not serialize JSON output: {e}"))?;
    println!("{text}");
    Ok(())
}

fn parse_global_settings_arg(args: &[String]) -> Result<(SpliceSettings, usize), String> {
    if args.len() >= 3 && args[1] == "--settings" {
        let settings = SpliceSettings::load_from_path(&args[2]).map_err(|e| e.to_string())?;
        return Ok((settings, 3));
    }
    Ok((SpliceSettings::default(), 1))
}

fn parse_selection(text: &str) -> Result<EnzymePairSelection, String> {
    let names: Vec<&str> = text
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    EnzymePairSelection::from_names(&names).map_err(|e| e.to_string())
}

fn option_value<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == name)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

struct Context {
    settings: SpliceSettings,
    catalog: Arc<dyn EnzymeSource>,
    panel: EnzymePanel,
}

impl Context {
    fn new(settings: SpliceSettings) -> Result<Self, String> {
        let enzymes = settings.enzymes().map_err(|e| e.to_string())?;
        let panel = enzymes.panel_for(&settings).map_err(|e| e.to_string())?;
        Ok(Self {
            settings,
            catalog: Arc::new(enzymes),
            panel,
        })
    }

    fn finder(&self, path: &str, topology: Topology) -> Result<SiteFinder, String> {
        let sequence = DNAsequence::from_file(path, topology)
            .map_err(|e| format!("Could not load sequence '{path}': {e}"))?;
        Ok(SiteFinder::new(
            sequence,
            self.catalog.clone(),
            self.panel.clone(),
        ))
    }

    fn assembler(&self, backbone: &str, insert: &str) -> Result<Assembler, String> {
        Ok(Assembler::with_settings(
            self.finder(backbone, self.settings.backbone_topology())?,
            self.finder(insert, self.settings.insert_topology())?,
            self.settings.clone(),
        ))
    }
}

fn write_sequence(dna: &DNAsequence, path: &str) -> Result<(), String> {
    let extension = Path::new(path)
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    let written = match extension.as_str() {
        "gb" | "gbk" | "genbank" => dna.write_genbank_file(path),
        _ => dna.write_fasta_file(path),
    };
    written.map_err(|e| format!("Could not write '{path}': {e}"))
}

/// `out.fa` -> `out.reverse.fa`
fn alternative_path(path: &str) -> String {
    let p = Path::new(path);
    match (p.file_stem(), p.extension()) {
        (Some(stem), Some(ext)) => p
            .with_file_name(format!(
                "{}.reverse.{}",
                stem.to_string_lossy(),
                ext.to_string_lossy()
            ))
            .to_string_lossy()
            .to_string(),
        _ => format!("{path}.reverse"),
    }
}

fn main() {
    init_logging();
    if let Err(e) = run() {
        eprintln!("{e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let args: Vec<String> = env::args().collect();
    if args.len() <= 1 {
        usage();
        return Err("Missing command".to_string());
    }
    if args.iter().any(|a| a == "--version" || a == "-V") {
        println!("gentle_splice {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let (settings, cmd_idx) = parse_global_settings_arg(&args)?;
    if args.len() <= cmd_idx {
        usage();
        return Err("Missing command".to_string());
    }
    let command = &args[cmd_idx];
    let rest = &args[cmd_idx + 1..];

    match command.as_str() {
        "shared" => {
            if rest.len() < 2 {
                usage();
                return Err("shared needs BACKBONE and INSERT".to_string());
            }
            let context = Context::new(settings)?;
            let assembler = context.assembler(&rest[0], &rest[1])?;
            print_json(&SharedSummary {
                shared_single: assembler.shared_single().clone(),
                shared_any: assembler.shared_any().clone(),
                backbone_cuts: assembler.backbone_shared_cuts().clone(),
                insert_cuts: assembler.insert_shared_cuts().clone(),
            })
        }
        "check" => {
            if rest.len() < 2 {
                usage();
                return Err("check needs BACKBONE_ENZYMES and INSERT_ENZYMES".to_string());
            }
            let enzymes = settings.enzymes().map_err(|e| e.to_string())?;
            let backbone = parse_selection(&rest[0])?;
            let insert = parse_selection(&rest[1])?;
            let matrix =
                CompatibilityMatrix::from_catalog(&backbone.names(), &insert.names(), &enzymes);
            print_json(&CheckSummary {
                verdict: matrix.verdict(),
                row_sums: matrix.row_sums(),
                unassignable: matrix
                    .unassignable()
                    .into_iter()
                    .map(str::to_string)
                    .collect(),
            })
        }
        "integrate" => {
            if rest.len() < 5 {
                usage();
                return Err(
                    "integrate needs BACKBONE INSERT BACKBONE_ENZYMES INSERT_ENZYMES OUTPUT"
                        .to_string(),
                );
            }
            let context = Context::new(settings)?;
            let mut assembler = context.assembler(&rest[0], &rest[1])?;
            let backbone = parse_selection(&rest[2])?;
            let insert = parse_selection(&rest[3])?;
            let output = &rest[4];
            let result = match rest.iter().any(|a| a == "--oriented") {
                true => assembler
                    .integrate_oriented(&backbone, &insert)
                    .map(|(_, result)| result),
                false => assembler.integrate(&backbone, &insert),
            }
            .map_err(|e| e.to_string())?;

            let mut summaries = vec![];
            for (i, candidate) in result.candidates().into_iter().enumerate() {
                let path = match i {
                    0 => output.to_string(),
                    _ => alternative_path(output),
                };
                write_sequence(&candidate.sequence, &path)?;
                summaries.push(CandidateSummary {
                    path,
                    length: candidate.sequence.len(),
                    circular: candidate.sequence.is_circular(),
                    layout: candidate.layout.clone(),
                    single_cut: candidate
                        .finder
                        .single_cut_enzymes()
                        .keys()
                        .cloned()
                        .collect(),
                });
            }
            print_json(&summaries)
        }
        "table" => {
            if rest.len() < 2 {
                usage();
                return Err("table needs SEQUENCE and OUTPUT".to_string());
            }
            let delimiter = settings.table_delimiter_byte().map_err(|e| e.to_string())?;
            let context = Context::new(settings)?;
            let mut finder = context.finder(&rest[0], context.settings.backbone_topology())?;
            let cuts = match option_value(rest, "--cuts") {
                Some(k) => Some(
                    k.parse::<usize>()
                        .map_err(|e| format!("Invalid cut count '{k}': {e}"))?,
                ),
                None => None,
            };
            let rows = match option_value(rest, "--suppliers") {
                Some(codes) => {
                    finder.filter_by_supplier(&codes.chars().collect(), cuts);
                    finder.supplier_filtered_table()
                }
                None => finder.enzyme_table(cuts),
            };
            let output = &rest[1];
            let saved = match rest.iter().any(|a| a == "--by-supplier") {
                true => save_supplier_table(output, &finder.supplier_table(), delimiter),
                false => save_enzyme_table(output, &rows, delimiter),
            };
            saved.map_err(|e| format!("Could not write table '{output}': {e}"))?;
            println!("Wrote {output}");
            Ok(())
        }
        "map" => {
            if rest.is_empty() {
                usage();
                return Err("map needs SEQUENCE".to_string());
            }
            let context = Context::new(settings)?;
            let finder = context.finder(&rest[0], context.settings.backbone_topology())?;
            let sequence = finder.sequence();
            print_json(&MapSummary {
                name: sequence.name().clone(),
                length: sequence.len(),
                circular: sequence.is_circular(),
                features: finder.enzyme_features(context.settings.max_map_cut_sites),
            })
        }
        other => {
            usage();
            Err(format!("Unknown command '{other}'"))
        }
    }
}
