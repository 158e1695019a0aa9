//! BNPL Risk Scoring - Demo Entry Point
//!
//! Loads an artifact bundle, scores one applicant and prints the full
//! assessment. Intended for smoke-testing a bundle from the command line:
//!
//! ```text
//! bnpl-risk-core [BUNDLE_DIR] [APPLICANT_JSON]
//! ```
//!
//! With no arguments the platform-default bundle directory is tried first,
//! then the repository's `testdata/model` bundle, and a built-in example
//! applicant is scored.

use std::path::PathBuf;
use std::process;

use bnpl_risk_core::constants;
use bnpl_risk_core::limits::RiskBand;
use bnpl_risk_core::record::ApplicantRecord;
use bnpl_risk_core::store;

fn resolve_bundle_dir(arg: Option<&str>) -> PathBuf {
    if let Some(dir) = arg {
        return PathBuf::from(dir);
    }
    let default = store::default_bundle_dir();
    if default.join(store::MANIFEST_FILE).is_file() {
        return default;
    }
    // Repository checkout fallback so the demo runs out of the box
    PathBuf::from("testdata").join("model")
}

fn example_applicant() -> ApplicantRecord {
    let mut record = ApplicantRecord::new();
    record.insert("age", 28.0);
    record.insert("annual_income", 70_000.0);
    record.insert("credit_score", 720.0);
    record.insert("employment_length_years", 4.0);
    record.insert("debt_to_income_ratio", 0.25);
    record.insert("number_of_credit_cards", 2.0);
    record.insert("past_defaults", 0.0);
    record.insert("monthly_rent", 1_600.0);
    record.insert("savings_balance", 12_000.0);
    record
}

fn load_applicant(path: &str) -> ApplicantRecord {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) => {
            log::error!("Failed to read applicant file {}: {}", path, e);
            process::exit(1);
        }
    };
    match ApplicantRecord::from_json_str(&raw) {
        Ok(record) => record,
        Err(e) => {
            log::error!("Failed to parse applicant file {}: {}", path, e);
            process::exit(1);
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!(
        "Starting {} v{}...",
        constants::APP_NAME,
        constants::APP_VERSION
    );

    let args: Vec<String> = std::env::args().collect();
    let bundle_dir = resolve_bundle_dir(args.get(1).map(String::as_str));

    if let Err(e) = store::init(&bundle_dir) {
        log::error!(
            "Failed to load artifact bundle from {}: {}",
            bundle_dir.display(),
            e
        );
        process::exit(1);
    }

    let status = store::status();
    log::info!(
        "Model {} ready ({} features)",
        status.model_id.as_deref().unwrap_or("?"),
        status.feature_count
    );

    let applicant = match args.get(2) {
        Some(path) => load_applicant(path),
        None => {
            log::info!("No applicant file given - scoring the built-in example");
            example_applicant()
        }
    };

    let assessment = match store::assess(&applicant) {
        Ok(a) => a,
        Err(e) => {
            log::error!("Scoring failed: {}", e);
            process::exit(1);
        }
    };

    let band = RiskBand::from_default_probability(assessment.default_probability);
    let decision = if assessment.will_default {
        "DECLINE"
    } else {
        "APPROVE"
    };

    println!(
        "Decision: {} (p_default = {:.4}, band = {})",
        decision, assessment.default_probability, band
    );
    println!("Top risk factors:");
    for factor in &assessment.risk_factors {
        println!("  {:<28} {:.3}", factor.feature, factor.importance);
    }
    println!(
        "Limit multiplier at next review: x{:.1}",
        band.limit_adjustment()
    );

    match serde_json::to_string_pretty(&assessment) {
        Ok(json) => println!("{}", json),
        Err(e) => log::warn!("Could not serialize assessment: {}", e),
    }
}
