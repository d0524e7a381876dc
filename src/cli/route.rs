//! CLI route: single route table and run context. Dispatches to generation and cleanup,
//! then to presentation.

use crate::batch::ShuffleMode;
use crate::clean::{run_clean, AssumeYes, CleanRequest, CleanSelector, Confirmer};
use crate::cli::parse::{CleanArgs, Commands, GenerateArgs};
use crate::config::{ConfigLoader, TurnoutConfig};
use crate::error::ApiError;
use crate::generation::{run_generate, GenerateRequest, GenerationConfig};
use crate::remote::{DriveFile, GoogleSheetsClient, SheetsService};
use std::path::PathBuf;
use tracing::info;

/// Rendered command output plus the error that should set a failing exit status.
///
/// Partial runs carry both: the report is printed and the process still exits non-zero.
#[derive(Debug)]
pub struct CommandOutput {
    pub rendered: String,
    pub failure: Option<ApiError>,
}

impl CommandOutput {
    fn new(rendered: String, failure: Option<ApiError>) -> Self {
        Self { rendered, failure }
    }
}

/// Interactive yes/no prompt before deleting. Lists every match first.
pub struct DialoguerConfirmer;

impl Confirmer for DialoguerConfirmer {
    fn confirm(&self, matches: &[DriveFile]) -> Result<bool, ApiError> {
        use dialoguer::Confirm;
        eprintln!("{}", super::format_match_list(matches));
        Confirm::new()
            .with_prompt(super::format_deletion_prompt(matches))
            .default(false)
            .interact()
            .map_err(|e| ApiError::ConfigError(format!("Failed to get user input: {}", e)))
    }
}

/// Runtime context for CLI execution: the loaded configuration.
/// Built from workspace path and optional config path using ConfigLoader only.
pub struct RunContext {
    config: TurnoutConfig,
}

impl RunContext {
    pub fn new(workspace_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, ApiError> {
        let config = if let Some(ref cfg_path) = config_path {
            ConfigLoader::load_from_file(cfg_path)?
        } else {
            ConfigLoader::load(&workspace_root)?
        };
        Ok(Self { config })
    }

    pub fn from_config(config: TurnoutConfig) -> Self {
        Self { config }
    }

    /// Execute a CLI command against the live spreadsheet service.
    pub fn execute(&self, command: &Commands) -> Result<CommandOutput, ApiError> {
        // Reject bad flags before touching credentials or the network.
        if let Commands::Generate(args) = command {
            self.generation_config(args)?;
        }
        let client = GoogleSheetsClient::new(&self.config.remote)?;
        let rt = tokio::runtime::Runtime::new().map_err(|e| {
            ApiError::ConfigError(format!("Failed to create tokio runtime: {}", e))
        })?;
        rt.block_on(self.execute_with_service(command, &client, &DialoguerConfirmer))
    }

    /// Execute a command with an injected service and confirmer.
    pub async fn execute_with_service(
        &self,
        command: &Commands,
        service: &dyn SheetsService,
        confirmer: &dyn Confirmer,
    ) -> Result<CommandOutput, ApiError> {
        match command {
            Commands::Generate(args) => self.handle_generate(args, service).await,
            Commands::Clean(args) => {
                if args.yes {
                    self.handle_clean(args, service, &AssumeYes).await
                } else {
                    self.handle_clean(args, service, confirmer).await
                }
            }
        }
    }

    /// Configured generation defaults with CLI flags applied on top.
    pub fn generation_config(&self, args: &GenerateArgs) -> Result<GenerationConfig, ApiError> {
        check_format(&args.format)?;
        let mut settings = self.config.generate.clone();
        if let Some(ref source) = args.source {
            settings.source_id = source.clone();
        }
        if let Some(template) = args.template_sheet {
            settings.template_region_id = Some(template);
        }
        if let Some(ref range) = args.read_range {
            settings.read_range = range.clone();
        }
        if let Some(idx) = args.do_turnout_idx {
            settings.columns.include_idx = idx;
        }
        if let Some(idx) = args.first_name_idx {
            settings.columns.name_idx = idx;
        }
        if let Some(idx) = args.phone_idx {
            settings.columns.phone_idx = idx;
        }
        if let Some(size) = args.batch_size {
            settings.batch_size = size;
        }
        if let Some(fudge) = args.last_page_fudge {
            settings.last_page_fudge = fudge;
        }
        if let Some(concurrency) = args.concurrency {
            settings.concurrency = concurrency;
        }
        if let Some(ref prefix) = args.title_prefix {
            settings.title_prefix = prefix.clone();
        }
        if args.no_shuffle {
            settings.shuffle = ShuffleMode::Off;
        } else if let Some(seed) = args.seed {
            settings.shuffle = ShuffleMode::Seeded(seed);
        }
        GenerationConfig::from_settings(settings, &args.date)
    }

    async fn handle_generate(
        &self,
        args: &GenerateArgs,
        service: &dyn SheetsService,
    ) -> Result<CommandOutput, ApiError> {
        let config = self.generation_config(args)?;
        let request = GenerateRequest {
            only_batches: if args.only_batch.is_empty() {
                None
            } else {
                Some(args.only_batch.clone())
            },
            dry_run: args.dry_run,
        };
        info!(date = %config.date, dry_run = request.dry_run, "Running generate");
        let report = run_generate(service, &config, &request).await?;
        let rendered = match args.format.as_str() {
            "json" => super::format_generation_report_json(&report)?,
            _ => super::format_generation_report_text(&report),
        };
        Ok(CommandOutput::new(rendered, report.combined_error()))
    }

    async fn handle_clean(
        &self,
        args: &CleanArgs,
        service: &dyn SheetsService,
        confirmer: &dyn Confirmer,
    ) -> Result<CommandOutput, ApiError> {
        check_format(&args.format)?;
        let title_prefix = args
            .title_prefix
            .clone()
            .unwrap_or_else(|| self.config.generate.title_prefix.clone());
        let selector = CleanSelector::from_parts(
            args.query.clone(),
            args.name_contains.clone(),
            args.date.clone(),
            &title_prefix,
        )?;
        let request = CleanRequest {
            selector,
            dry_run: args.test,
            concurrency: args.concurrency.unwrap_or(self.config.clean.concurrency),
        };
        let report = run_clean(service, &request, confirmer).await?;
        let rendered = match args.format.as_str() {
            "json" => super::format_clean_report_json(&report)?,
            _ => super::format_clean_report_text(&report),
        };
        Ok(CommandOutput::new(rendered, report.combined_error()))
    }
}

fn check_format(format: &str) -> Result<(), ApiError> {
    match format {
        "text" | "json" => Ok(()),
        other => Err(ApiError::ConfigError(format!(
            "Invalid format: '{}'. Must be 'text' or 'json'.",
            other
        ))),
    }
}
