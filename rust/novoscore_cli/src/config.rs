use novoscore::scoring::DEFAULT_WORKER_COUNT;
use novoscore::{
    AlignmentConfig,
    Producer,
    ScoringConfig,
};
use serde::{
    Deserialize,
    Serialize,
};
use std::path::PathBuf;

use crate::cli::ScoreArgs;
use crate::errors::CliError;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    pub input: Option<InputConfig>,
    pub producer: Producer,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    /// Write per-identifier means. Defaults to the producer preset.
    #[serde(default)]
    pub aggregate: Option<bool>,
    pub output: Option<OutputConfig>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct InputConfig {
    pub parsed_table: PathBuf,
    #[serde(default)]
    pub inclusion_list: Option<PathBuf>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AnalysisConfig {
    /// Overrides the producer preset when set.
    #[serde(default)]
    pub alignment: Option<AlignmentConfig>,
    #[serde(default = "default_worker_count")]
    pub worker_count: usize,
}

fn default_worker_count() -> usize {
    DEFAULT_WORKER_COUNT
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            alignment: None,
            worker_count: DEFAULT_WORKER_COUNT,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OutputConfig {
    pub directory: PathBuf,
}

/// A configuration with every input resolved.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub parsed_table: PathBuf,
    pub inclusion_list: Option<PathBuf>,
    pub producer: Producer,
    pub scoring: ScoringConfig,
    pub aggregate: bool,
    pub output_directory: PathBuf,
}

impl Config {
    pub fn template() -> Self {
        Self {
            input: Some(InputConfig {
                parsed_table: PathBuf::from("directag_results_all_sequences.tsv"),
                inclusion_list: Some(PathBuf::from("peptides.txt")),
            }),
            producer: Producer::DirecTag,
            analysis: AnalysisConfig {
                alignment: Some(Producer::DirecTag.alignment_config()),
                worker_count: DEFAULT_WORKER_COUNT,
            },
            aggregate: Some(true),
            output: Some(OutputConfig {
                directory: PathBuf::from("novoscore_results"),
            }),
        }
    }

    /// Applies command line overrides on top of the file contents.
    pub fn apply_cli_args(&mut self, args: &ScoreArgs) {
        if let Some(producer) = args.producer {
            self.producer = producer;
        }
        if let Some(input) = &args.input {
            match self.input.as_mut() {
                Some(x) => x.parsed_table = input.clone(),
                None => {
                    self.input = Some(InputConfig {
                        parsed_table: input.clone(),
                        inclusion_list: None,
                    })
                }
            }
        }
        if let Some(inclusion_list) = &args.inclusion_list {
            if let Some(x) = self.input.as_mut() {
                x.inclusion_list = Some(inclusion_list.clone());
            }
        }
        if let Some(output_dir) = &args.output_dir {
            self.output = Some(OutputConfig {
                directory: output_dir.clone(),
            });
        }
        if let Some(workers) = args.workers {
            self.analysis.worker_count = workers;
        }
    }

    pub fn resolve(&self) -> Result<RunConfig, CliError> {
        let input = self.input.as_ref().ok_or_else(|| {
            CliError::Config(
                "No input provided, please provide one in either the config file or with the --input flag"
                    .to_string(),
            )
        })?;
        let output = self.output.as_ref().ok_or_else(|| {
            CliError::Config(
                "No output directory provided, please provide one in either the config file or with the --output-dir flag"
                    .to_string(),
            )
        })?;
        let alignment = self
            .analysis
            .alignment
            .unwrap_or_else(|| self.producer.alignment_config());
        let scoring = ScoringConfig::new(alignment, self.analysis.worker_count);
        scoring.validate()?;

        Ok(RunConfig {
            parsed_table: input.parsed_table.clone(),
            inclusion_list: input.inclusion_list.clone(),
            producer: self.producer,
            scoring,
            aggregate: self
                .aggregate
                .unwrap_or_else(|| self.producer.aggregates_by_default()),
            output_directory: output.directory.clone(),
        })
    }
}
