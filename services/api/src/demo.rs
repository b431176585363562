use crate::infra::{build_matching_service, load_seed, InMemoryMatchingService, SeedData};
use chrono::{Local, NaiveDate};
use clap::Args;
use std::path::PathBuf;
use tutor_match::config::MatchingConfig;
use tutor_match::error::AppError;
use tutor_match::matching::{
    CancellationFlag, ConflictCheck, GateStatus, MatchingServiceError, PostingScreening, TutorId,
};

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Tutor to screen against the open postings.
    #[arg(long, default_value = "tutor-ana")]
    pub(crate) tutor: String,
    /// Date the demo schedule is laid out on (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) date: Option<NaiveDate>,
    /// JSON seed file replacing the built-in demo dataset.
    #[arg(long)]
    pub(crate) seed: Option<PathBuf>,
    /// CSV language catalog replacing the built-in table.
    #[arg(long)]
    pub(crate) catalog: Option<PathBuf>,
    /// Reject postings whose experience requirement cannot be compared.
    #[arg(long)]
    pub(crate) strict_experience: bool,
    /// Print every gate check instead of the one-line rationale.
    #[arg(long)]
    pub(crate) verbose: bool,
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        tutor,
        date,
        seed,
        catalog,
        strict_experience,
        verbose,
    } = args;

    let date = date.unwrap_or_else(|| Local::now().date_naive());
    let config = MatchingConfig {
        language_catalog: catalog,
        seed_path: seed,
        reject_on_experience_mismatch: strict_experience,
    };
    let seed: SeedData = load_seed(&config, date)?;
    let service = build_matching_service(&config, seed)?;
    let tutor_id = TutorId(tutor);

    println!("Tutor matching demo for {tutor_id} on {date}");
    let screenings = service
        .screen_postings(&tutor_id, &CancellationFlag::new())
        .await?;

    render_screenings(&screenings, verbose);
    render_schedule(&service, &tutor_id, &screenings).await?;
    Ok(())
}

fn render_screenings(screenings: &[PostingScreening], verbose: bool) {
    let eligible = screenings.iter().filter(|screening| screening.eligible).count();
    println!(
        "\nScreened {} open postings | {} eligible",
        screenings.len(),
        eligible
    );

    for screening in screenings {
        let marker = if screening.eligible { "+" } else { "-" };
        println!(
            "  {marker} {} ({}): {}",
            screening.title, screening.posting_id, screening.rationale
        );

        if !verbose {
            continue;
        }
        if let Some(outcome) = &screening.outcome {
            for check in &outcome.checks {
                let status = match check.status {
                    GateStatus::Passed => "pass",
                    GateStatus::Skipped => "skip",
                    GateStatus::Failed => "FAIL",
                };
                println!("      [{status}] {}: {}", check.gate.label(), check.notes);
            }
        }
    }
}

async fn render_schedule(
    service: &InMemoryMatchingService,
    tutor_id: &TutorId,
    screenings: &[PostingScreening],
) -> Result<(), MatchingServiceError> {
    println!("\nBooking check for eligible postings");
    let mut checked = 0;

    for screening in screenings.iter().filter(|screening| screening.eligible) {
        let Some(slot) = screening.schedule else {
            println!("  - {}: no class time on the posting", screening.posting_id);
            continue;
        };
        checked += 1;

        let request = ConflictCheck {
            tutor_id: tutor_id.clone(),
            date: slot.date,
            start: slot.start,
            duration_minutes: slot.duration_minutes,
            exclude_block_id: None,
        };
        if !service.check_schedule(&request).await? {
            println!(
                "  - {} at {} for {} min: free",
                screening.posting_id,
                slot.start.format("%H:%M"),
                slot.duration_minutes
            );
            continue;
        }

        let ids: Vec<String> = service
            .conflicting_blocks(&request)
            .await?
            .iter()
            .map(|block| block.block_id.to_string())
            .collect();
        println!(
            "  - {} at {} for {} min: conflicts with {}",
            screening.posting_id,
            slot.start.format("%H:%M"),
            slot.duration_minutes,
            ids.join(", ")
        );
    }

    if checked == 0 {
        println!("  (nothing to book)");
    }
    Ok(())
}
