//! `hbt lab` command - lab tests and verdicts (the analyst's portal)

use chrono::{NaiveDate, Utc};
use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{open_store, truncate_str};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::identity::{self, RecordPrefix};
use crate::core::quality::{self, Measurements};
use crate::entities::labtest::{LabTest, LabTestPatch, NewLabTest, TestStatus};

#[derive(Subcommand, Debug)]
pub enum LabCommands {
    /// Record a new lab test for a processing batch
    New(NewArgs),

    /// Evaluate a pending test's measurements against the thresholds
    Result(ResultArgs),

    /// Approve a test, issuing a certificate
    Approve(ApproveArgs),

    /// Reject a test
    Reject(RejectArgs),

    /// List lab tests
    List(ListArgs),

    /// Show one lab test
    Show(ShowArgs),
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Processing batch the sample came from (id, prefix match)
    pub batch: String,

    /// Moisture content (%)
    #[arg(long)]
    pub moisture: f64,

    /// DNA barcode match (%)
    #[arg(long)]
    pub dna_match: f64,

    /// Pesticide residue (ppm)
    #[arg(long)]
    pub pesticide: f64,

    /// Sample temperature (deg C)
    #[arg(long)]
    pub temperature: f64,

    /// Test date (YYYY-MM-DD, defaults to today)
    #[arg(long)]
    pub test_date: Option<NaiveDate>,
}

#[derive(clap::Args, Debug)]
pub struct ResultArgs {
    /// Test id (prefix match)
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct ApproveArgs {
    /// Test id (prefix match)
    pub id: String,

    /// Certificate id (generated when omitted)
    #[arg(long)]
    pub certificate: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct RejectArgs {
    /// Test id (prefix match)
    pub id: String,

    /// Rejection reason (defaults to the failed threshold summary)
    #[arg(long)]
    pub reason: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Only tests awaiting evaluation or verdict
    #[arg(long)]
    pub open: bool,

    /// Show count only, not the items
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Test id (prefix match)
    pub id: String,
}

pub fn run(cmd: LabCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        LabCommands::New(args) => run_new(args, global),
        LabCommands::Result(args) => run_result(args),
        LabCommands::Approve(args) => run_approve(args),
        LabCommands::Reject(args) => run_reject(args),
        LabCommands::List(args) => run_list(args, global),
        LabCommands::Show(args) => run_show(args, global),
    }
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let (_, mut store) = open_store()?;

    let batch = store
        .find_batch(&args.batch)
        .ok_or_else(|| miette::miette!("No processing batch matching '{}'", args.batch))?;

    let new = NewLabTest {
        batch_id: batch.id.clone(),
        herb_name: batch.herb_name.clone(),
        measurements: Measurements {
            moisture: args.moisture,
            dna_match: args.dna_match,
            pesticide: args.pesticide,
            temperature: args.temperature,
        },
        test_date: args.test_date.unwrap_or_else(|| Utc::now().date_naive()),
    };

    let test = store.add_lab_test(new).map_err(|e| miette::miette!("{}", e))?;

    match global.format {
        OutputFormat::Id => println!("{}", test.id),
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&test).into_diagnostic()?)
        }
        _ => {
            println!(
                "{} Recorded lab test {} for {}",
                style("✓").green(),
                style(&test.id).cyan(),
                style(&test.batch_id).yellow()
            );
            println!(
                "   Evaluate with: {}",
                style(format!("hbt lab result {}", test.id)).yellow()
            );
        }
    }

    Ok(())
}

fn run_result(args: ResultArgs) -> Result<()> {
    let (_, mut store) = open_store()?;

    let test = store
        .find_lab_test(&args.id)
        .ok_or_else(|| miette::miette!("No lab test matching '{}'", args.id))?;
    if test.status != TestStatus::Pending {
        return Err(miette::miette!(
            "Test {} was already evaluated (status: {})",
            test.id,
            test.status
        ));
    }
    let id = test.id.clone();
    let evaluation = quality::evaluate(&test.measurements);

    store
        .update_lab_test(
            &id,
            LabTestPatch {
                status: Some(TestStatus::Tested),
                ..LabTestPatch::default()
            },
        )
        .map_err(|e| miette::miette!("{}", e))?;

    if evaluation.passed() {
        println!(
            "{} {} - {}",
            style("✓").green(),
            style(&id).cyan(),
            style("PASS").green().bold()
        );
        println!(
            "   Approve with: {}",
            style(format!("hbt lab approve {}", id)).yellow()
        );
    } else {
        println!(
            "{} {} - {}",
            style("✗").red(),
            style(&id).cyan(),
            style("FAIL").red().bold()
        );
        for failure in &evaluation.failures {
            println!("   {} {}", style("!").yellow(), failure);
        }
        println!(
            "   Reject with: {}",
            style(format!("hbt lab reject {}", id)).yellow()
        );
    }

    Ok(())
}

fn run_approve(args: ApproveArgs) -> Result<()> {
    let (_, mut store) = open_store()?;

    let id = store
        .find_lab_test(&args.id)
        .map(|t| t.id.clone())
        .ok_or_else(|| miette::miette!("No lab test matching '{}'", args.id))?;

    let certificate_id = args.certificate.unwrap_or_else(|| {
        identity::next_id(RecordPrefix::Certificate, Utc::now(), |_| false)
    });

    let updated = store
        .update_lab_test(
            &id,
            LabTestPatch {
                status: Some(TestStatus::Approved),
                certificate_id: Some(certificate_id),
                rejection_reason: None,
            },
        )
        .map_err(|e| miette::miette!("{}", e))?
        .ok_or_else(|| miette::miette!("No lab test matching '{}'", args.id))?;

    println!(
        "{} Approved {} (certificate {})",
        style("✓").green(),
        style(&updated.id).cyan(),
        style(updated.certificate_id.as_deref().unwrap_or("-")).yellow()
    );
    println!("   Underlying collection marked approved");

    Ok(())
}

fn run_reject(args: RejectArgs) -> Result<()> {
    let (_, mut store) = open_store()?;

    let test = store
        .find_lab_test(&args.id)
        .ok_or_else(|| miette::miette!("No lab test matching '{}'", args.id))?;
    let id = test.id.clone();

    let reason = args
        .reason
        .unwrap_or_else(|| quality::evaluate(&test.measurements).summary());

    let updated = store
        .update_lab_test(
            &id,
            LabTestPatch {
                status: Some(TestStatus::Rejected),
                certificate_id: None,
                rejection_reason: Some(reason),
            },
        )
        .map_err(|e| miette::miette!("{}", e))?
        .ok_or_else(|| miette::miette!("No lab test matching '{}'", args.id))?;

    println!(
        "{} Rejected {}",
        style("✗").red(),
        style(&updated.id).cyan()
    );
    println!(
        "   {}",
        style(updated.rejection_reason.as_deref().unwrap_or("-")).dim()
    );
    println!("   Underlying collection marked rejected");

    Ok(())
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let (_, store) = open_store()?;

    let tests: Vec<&LabTest> = store
        .lab_tests()
        .iter()
        .filter(|t| {
            !args.open || matches!(t.status, TestStatus::Pending | TestStatus::Tested)
        })
        .collect();

    if args.count {
        println!("{}", tests.len());
        return Ok(());
    }

    match global.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&tests).into_diagnostic()?);
            return Ok(());
        }
        OutputFormat::Id => {
            for test in &tests {
                println!("{}", test.id);
            }
            return Ok(());
        }
        OutputFormat::Tsv => {
            for test in &tests {
                println!(
                    "{}\t{}\t{}\t{}\t{}",
                    test.id, test.batch_id, test.herb_name, test.test_date, test.status
                );
            }
            return Ok(());
        }
        _ => {}
    }

    if tests.is_empty() {
        println!("No lab tests found.");
        return Ok(());
    }

    println!(
        "{:<20} {:<20} {:<20} {:<12} {:<10}",
        style("ID").bold(),
        style("BATCH").bold(),
        style("HERB").bold(),
        style("DATE").bold(),
        style("STATUS").bold()
    );
    println!("{}", "-".repeat(84));

    for test in &tests {
        println!(
            "{:<20} {:<20} {:<20} {:<12} {:<10}",
            truncate_str(&test.id, 18),
            truncate_str(&test.batch_id, 18),
            truncate_str(&test.herb_name, 18),
            test.test_date.to_string(),
            test.status.to_string()
        );
    }

    println!();
    println!("{} lab test(s) found", style(tests.len()).cyan());

    Ok(())
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let (_, store) = open_store()?;

    let test = store
        .find_lab_test(&args.id)
        .ok_or_else(|| miette::miette!("No lab test matching '{}'", args.id))?;

    match global.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(test).into_diagnostic()?);
            return Ok(());
        }
        OutputFormat::Id => {
            println!("{}", test.id);
            return Ok(());
        }
        _ => {}
    }

    let evaluation = quality::evaluate(&test.measurements);

    println!("{}", style("─".repeat(60)).dim());
    println!("{}: {}", style("ID").bold(), style(&test.id).cyan());
    println!(
        "{}: {}",
        style("Batch").bold(),
        style(&test.batch_id).yellow()
    );
    println!("{}: {}", style("Herb").bold(), test.herb_name);
    println!("{}: {}", style("Tested").bold(), test.test_date);
    println!("{}: {}", style("Status").bold(), test.status);
    println!("{}", style("Measurements:").bold());
    println!("  moisture     {:>7.2} %", test.measurements.moisture);
    println!("  DNA match    {:>7.2} %", test.measurements.dna_match);
    println!("  pesticide    {:>7.2} ppm", test.measurements.pesticide);
    println!("  temperature  {:>7.2} C", test.measurements.temperature);
    println!(
        "{}: {}",
        style("Thresholds").bold(),
        if evaluation.passed() {
            style("pass").green()
        } else {
            style("fail").red()
        }
    );
    for failure in &evaluation.failures {
        println!("   {} {}", style("!").yellow(), failure);
    }
    if let Some(certificate) = &test.certificate_id {
        println!("{}: {}", style("Certificate").bold(), certificate);
    }
    if let Some(reason) = &test.rejection_reason {
        println!("{}: {}", style("Rejected because").bold(), reason);
    }
    println!("{}", style("─".repeat(60)).dim());

    Ok(())
}
