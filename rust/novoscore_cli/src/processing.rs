use indicatif::{
    ProgressBar,
    ProgressStyle,
};
use novoscore::data_sources::{
    read_inclusion_list,
    read_parsed_table,
    write_tsv,
};
use novoscore::models::partition_labeled;
use novoscore::scoring::ScoreTimings;
use novoscore::{
    InclusionMatcher,
    LabeledPair,
    ScoreRecord,
    ScoringOrchestrator,
    group_and_average,
};
use serde::Serialize;
use std::path::Path;
use std::time::Instant;
use tracing::{
    info,
    warn,
};

use crate::config::RunConfig;
use crate::errors::CliError;

const PROGRESS_TEMPLATE: &str =
    "{spinner:.green} {msg} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({eta})";

#[derive(Debug, Default, Serialize)]
pub struct RunSummary {
    pub rows: usize,
    pub labeled_rows: usize,
    pub unlabeled_rows: usize,
    pub inclusion_matched_ids: usize,
    pub inclusion_unmatched_ids: usize,
    pub timings: ScoreTimings,
}

fn progress_bar(len: usize, msg: &'static str) -> Result<ProgressBar, CliError> {
    let style = ProgressStyle::with_template(PROGRESS_TEMPLATE)?;
    Ok(ProgressBar::new(len as u64).with_style(style).with_message(msg))
}

/// Scores `pairs` and writes the record table, plus the grouped table when requested.
fn score_and_write(
    config: &RunConfig,
    pairs: &[LabeledPair],
    prefix: &str,
) -> Result<(Vec<ScoreRecord>, ScoreTimings), CliError> {
    let progress = progress_bar(pairs.len(), "scoring")?;
    let orchestrator = ScoringOrchestrator::new(config.scoring)?.with_progress(progress.clone());
    let (records, timings) = orchestrator.score(pairs)?;
    progress.finish_and_clear();

    let out_path = config.output_directory.join(format!("{}.tsv", prefix));
    write_tsv(&out_path, &records)?;
    info!("Wrote {} scored rows to {}", records.len(), out_path.display());

    if config.aggregate {
        let grouped = group_and_average(&records);
        let grouped_path = config
            .output_directory
            .join(format!("{}_grouped.tsv", prefix));
        write_tsv(&grouped_path, grouped.values())?;
        info!(
            "Wrote {} grouped rows to {}",
            grouped.len(),
            grouped_path.display()
        );
    }
    Ok((records, timings))
}

pub fn process_parsed_table(config: &RunConfig) -> Result<RunSummary, CliError> {
    let st = Instant::now();
    std::fs::create_dir_all(&config.output_directory)?;

    let rows = read_parsed_table(&config.parsed_table)?;
    let num_rows = rows.len();
    let (pairs, unlabeled) = partition_labeled(rows);
    info!(
        "{} rows with ground truth, {} without",
        pairs.len(),
        unlabeled.len()
    );

    let mut summary = RunSummary {
        rows: num_rows,
        labeled_rows: pairs.len(),
        unlabeled_rows: unlabeled.len(),
        ..Default::default()
    };

    let (_, timings) = score_and_write(config, &pairs, "scored")?;
    summary.timings += timings;

    if !unlabeled.is_empty() {
        match &config.inclusion_list {
            Some(path) => {
                let candidates = read_inclusion_list(path)?;
                let matcher = InclusionMatcher::for_producer(
                    config.producer,
                    config.scoring.alignment,
                    config.scoring.worker_count,
                )?;
                let num_strategies = matcher.strategies().count();
                let progress = progress_bar(unlabeled.len() * num_strategies, "matching")?;
                let outcome = matcher
                    .with_progress(progress.clone())
                    .resolve(&unlabeled, &candidates)?;
                progress.finish_and_clear();

                let matches_path = config.output_directory.join("inclusion_matches.tsv");
                write_tsv(&matches_path, &outcome.matches)?;
                summary.inclusion_matched_ids = outcome.verdicts.len();
                summary.inclusion_unmatched_ids = outcome.unmatched_ids;

                let (_, timings) =
                    score_and_write(config, &outcome.labeled_pairs(), "inclusion_scored")?;
                summary.timings += timings;
            }
            None => warn!(
                "{} rows have no ground truth and no inclusion list was given, skipping them",
                unlabeled.len()
            ),
        }
    }

    write_summary(&config.output_directory.join("summary.json"), &summary)?;
    info!("Finished processing {} rows in {:?}", num_rows, st.elapsed());
    Ok(summary)
}

fn write_summary(path: &Path, summary: &RunSummary) -> Result<(), CliError> {
    let file = std::fs::File::create(path)?;
    serde_json::to_writer_pretty(file, summary)?;
    Ok(())
}
