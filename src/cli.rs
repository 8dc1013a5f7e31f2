use clap::{Parser, Subcommand};
use reissue_engine::config::{parse_output_format, Config};
use reissue_engine::diag::{Diagnostic, TracingDiagnostic};
use reissue_engine::error::{Error, Result};
use reissue_engine::logger::init_logging;
use reissue_engine::model::{FareApplication, FcChangeStatus, Money};
use reissue_engine::permutation::tag_war::{apply_tag_war, FareApplTarget};
use reissue_engine::permutation::{FareApplMap, ReissueCharges, StopByteTracker};
use reissue_engine::scenario::Scenario;
use reissue_engine::validation::stopover::PointKind;
use reissue_engine::validation::{PenaltyEstimator, StopoverConnectionValidator, StopoverMismatch};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "reissue-engine")]
#[command(about = "Voluntary changes permutation diagnostics - rule bytes, tag war, fees and stop bytes")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format: "human" or "json"
    #[arg(short, long)]
    pub format: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve the rule bytes of every permutation
    Resolve {
        /// Scenario JSON file
        #[arg(short, long)]
        scenario: PathBuf,
    },

    /// Run the tag war for every permutation
    TagWar {
        /// Scenario JSON file
        #[arg(short, long)]
        scenario: PathBuf,

        /// Override the scenario's travel commenced flag
        #[arg(long)]
        travel_commenced: bool,
    },

    /// Estimate the change fee of every permutation
    Fee {
        /// Scenario JSON file
        #[arg(short, long)]
        scenario: PathBuf,

        /// Payment currency
        #[arg(short, long, default_value = "USD")]
        currency: String,
    },

    /// Check stopover and connection points of every permutation
    Stopover {
        /// Scenario JSON file
        #[arg(short, long)]
        scenario: PathBuf,
    },

    /// Walk permutations in order and report the ones skipped by stop bytes
    StopBytes {
        /// Scenario JSON file
        #[arg(short, long)]
        scenario: PathBuf,
    },
}

/// Format output based on format type
fn format_output<T: serde::Serialize + std::fmt::Debug>(data: &T, format: &str) -> Result<String> {
    match format {
        "json" => serde_json::to_string_pretty(data)
            .map_err(|e| Error::Io(format!("Failed to serialize JSON: {}", e))),
        _ => Ok(format!("{:#?}", data)),
    }
}

pub fn run(cli: Cli) -> Result<()> {
    let mut config = Config::from_env()?;
    if let Some(format) = cli.format.as_deref() {
        config.set_output_format(parse_output_format(format)?);
    }
    init_logging(&config);
    let format = config.get_output_format().to_string();

    match cli.command {
        Commands::Resolve { scenario } => {
            let scenario = Scenario::load(&scenario)?;
            let mut diag = TracingDiagnostic;
            let output: Vec<ResolveOutput> = scenario
                .permutations
                .iter()
                .inspect(|perm| diag.on_rule_bytes_resolved(perm))
                .map(|perm| ResolveOutput {
                    permutation: perm.number(),
                    endorsement: perm.endorsement_byte(),
                    reissue_to_lower: perm.reissue_to_lower_byte(),
                    ticket_equal_or_higher: perm.ticket_equal_or_higher_byte().as_str(),
                    electronic_ticket: perm.electronic_ticket(),
                    residual_penalty: perm.residual_penalty_byte(),
                    form_of_refund: perm.form_of_refund_byte(),
                    stopover_connection: perm.stopover_connection_byte(),
                })
                .collect();
            println!("{}", format_output(&output, &format)?);
            Ok(())
        }

        Commands::TagWar {
            scenario,
            travel_commenced,
        } => {
            let mut scenario = Scenario::load(&scenario)?;
            let commenced = travel_commenced || scenario.trx.travel_commenced;
            let mut diag = TracingDiagnostic;
            let output: Vec<TagWarOutput> = scenario
                .permutations
                .iter_mut()
                .map(|perm| {
                    apply_tag_war(perm, commenced, FareApplTarget::Actual);
                    for status in FcChangeStatus::ALL {
                        let fa = perm.fare_appl(status);
                        let winner = perm.fare_appl_winner_tags().get(&fa).map(|w| w.as_ref());
                        diag.on_tag_war_winner(perm.number(), status, fa, winner);
                    }
                    TagWarOutput {
                        permutation: perm.number(),
                        fare_appl: *perm.fare_appl_map(),
                        need_keep_fare: perm.need_keep_fare(),
                        winners: perm
                            .fare_appl_winner_tags()
                            .iter()
                            .map(|(fa, pti)| WinnerOutput {
                                fare_appl: *fa,
                                fare_component: pti.fare_comp_number(),
                                process_tag: pti.process_tag().number(),
                                seq_no: pti.seq_no(),
                            })
                            .collect(),
                    }
                })
                .collect();
            println!("{}", format_output(&output, &format)?);
            Ok(())
        }

        Commands::Fee { scenario, currency } => {
            let mut scenario = Scenario::load(&scenario)?;
            let estimator = PenaltyEstimator::new(scenario.rates.clone(), &currency);
            let mut diag = TracingDiagnostic;
            let unmatched = scenario.unmatched_fare_components.clone();
            let output: Vec<FeeOutput> = scenario
                .permutations
                .iter_mut()
                .map(|perm| {
                    let charges = estimator.estimate(perm, &unmatched);
                    diag.on_fee_estimated(perm.number(), &charges);
                    FeeOutput {
                        permutation: perm.number(),
                        estimated_change_fee: perm.estimated_change_fee().cloned(),
                        charges: ReissueCharges::clone(&charges),
                    }
                })
                .collect();
            println!("{}", format_output(&output, &format)?);
            Ok(())
        }

        Commands::Stopover { scenario } => {
            let scenario = Scenario::load(&scenario)?;
            let mut validator =
                StopoverConnectionValidator::with_diagnostic(&scenario.trx, &scenario.fare_path, TracingDiagnostic);
            let output: Vec<StopoverOutput> = scenario
                .permutations
                .iter()
                .map(|perm| {
                    let byte = perm.stopover_connection_byte();
                    let valid = validator.validate(perm);
                    StopoverOutput {
                        permutation: perm.number(),
                        byte,
                        valid,
                        mismatch: PointKind::from_byte(byte).and_then(|kind| validator.mismatch(kind)),
                    }
                })
                .collect();
            println!("{}", format_output(&output, &format)?);
            Ok(())
        }

        Commands::StopBytes { scenario } => {
            let scenario = Scenario::load(&scenario)?;
            let mut tracker = StopByteTracker::new();
            let mut diag = TracingDiagnostic;
            let output: Vec<StopByteOutput> = scenario
                .permutations
                .iter()
                .map(|perm| {
                    let skipped_by = tracker.stopped_by(perm);
                    match skipped_by {
                        Some(stopper) => diag.on_permutation_skipped(perm.number(), stopper),
                        None => tracker.save_stop_byte_info(perm),
                    }
                    StopByteOutput {
                        permutation: perm.number(),
                        skipped_by,
                    }
                })
                .collect();
            println!("{}", format_output(&output, &format)?);
            Ok(())
        }
    }
}

#[derive(Debug, serde::Serialize)]
struct ResolveOutput {
    permutation: u32,
    endorsement: char,
    reissue_to_lower: char,
    ticket_equal_or_higher: &'static str,
    electronic_ticket: char,
    residual_penalty: char,
    form_of_refund: char,
    stopover_connection: char,
}

#[derive(Debug, serde::Serialize)]
struct WinnerOutput {
    fare_appl: FareApplication,
    fare_component: u16,
    process_tag: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    seq_no: Option<u32>,
}

#[derive(Debug, serde::Serialize)]
struct TagWarOutput {
    permutation: u32,
    fare_appl: FareApplMap,
    need_keep_fare: bool,
    winners: Vec<WinnerOutput>,
}

#[derive(Debug, serde::Serialize)]
struct FeeOutput {
    permutation: u32,
    estimated_change_fee: Option<Money>,
    charges: ReissueCharges,
}

#[derive(Debug, serde::Serialize)]
struct StopoverOutput {
    permutation: u32,
    byte: char,
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    mismatch: Option<StopoverMismatch>,
}

#[derive(Debug, serde::Serialize)]
struct StopByteOutput {
    permutation: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    skipped_by: Option<u32>,
}
