use tracing::{
    info,
    instrument,
};

use crate::cli::{
    ScoreArgs,
    WriteTemplateArgs,
};
use crate::config::Config;
use crate::errors::CliError;
use crate::processing::process_parsed_table;

const TEMPLATE_FILE_NAME: &str = "novoscore_config_template.json";

/// Main function for the 'score' subcommand.
#[instrument]
pub fn main_score(args: ScoreArgs) -> Result<(), CliError> {
    let mut config: Config = serde_json::from_str(&std::fs::read_to_string(&args.config)?)?;
    config.apply_cli_args(&args);
    let run_config = config.resolve()?;
    info!("Parsed configuration: {:#?}", run_config);

    let summary = process_parsed_table(&run_config)?;
    info!(
        "Scored {} labeled rows, matched {} of {} unlabeled identifiers",
        summary.labeled_rows,
        summary.inclusion_matched_ids,
        summary.inclusion_matched_ids + summary.inclusion_unmatched_ids
    );
    Ok(())
}

/// Main function for the 'write-template' subcommand.
pub fn main_write_template(args: WriteTemplateArgs) -> Result<(), CliError> {
    let target_dir = args.output_path;
    std::fs::create_dir_all(&target_dir)?;

    let path = target_dir.join(TEMPLATE_FILE_NAME);
    std::fs::write(&path, serde_json::to_string_pretty(&Config::template())?)?;
    println!("Wrote config template to: {}", path.display());
    Ok(())
}
