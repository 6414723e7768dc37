use anyhow::{Context as _, Result};
use clap::Args;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::config::ConvertConfig;
use crate::context::Context;
use crate::convert::{
    AppType, Conversion, ProviderBlock, SchemaSelector, StateParser, Variant, assemble_headers,
    classify_all, convert,
};
use crate::error::ConvertError;
use crate::iac::{IacExecutor, TerraformExecutor};
use crate::remote::onelogin::DEFAULT_API_URL;
use crate::remote::{
    AppSource, OneLoginApps, OneLoginCredentials, RemoteResource, fetch_all,
};

const DECLARATION_FILE: &str = "main.tf";
const STATE_FILE: &str = "terraform.tfstate";

/// Convert apps from one resource type to another
#[derive(Debug, Args)]
pub struct ConvertArgs {
    /// Source resource type (e.g. onelogin_saml_apps)
    pub source: String,

    /// Destination resource type (e.g. onelogin_apps)
    pub destination: String,

    /// Skip the confirmation prompt
    #[arg(long = "auto_approve")]
    pub auto_approve: bool,

    /// Only convert the app with this id (it must be of the source type)
    #[arg(long)]
    pub id: Option<i64>,

    /// Path to a configuration file (defaults to .appconv.yaml, then ~/.appconv/config.yaml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory the source and destination folders are created in
    #[arg(short, long, default_value = ".")]
    pub workdir: PathBuf,

    /// OneLogin API base URL
    #[arg(long, env = "ONELOGIN_OAPI_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// OneLogin API client id
    #[arg(long, env = "ONELOGIN_CLIENT_ID", hide_env_values = true)]
    pub client_id: Option<String>,

    /// OneLogin API client secret
    #[arg(long, env = "ONELOGIN_CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: Option<String>,
}

/// How a conversion run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The user declined the confirmation prompt
    Aborted,
    /// The listing came back empty
    NothingToConvert,
    Completed { converted: usize },
}

/// Per-run settings resolved from arguments and configuration
pub struct RunSettings {
    pub conversion: Conversion,
    pub config: ConvertConfig,
    pub working_dir: PathBuf,
    pub auto_approve: bool,
    pub id: Option<i64>,
}

impl RunSettings {
    fn source_dir(&self) -> PathBuf {
        self.working_dir.join(&self.config.source_dir)
    }

    fn destination_dir(&self) -> PathBuf {
        self.working_dir.join(&self.config.destination_dir)
    }
}

pub struct ConvertCommand;

impl ConvertCommand {
    /// Execute the convert command
    pub fn execute(ctx: &Context, args: ConvertArgs) -> Result<()> {
        let conversion = Conversion::resolve(&args.source, &args.destination)?;
        let config = ConvertConfig::load(&*ctx.fs, &args.workdir, args.config.as_deref())?;

        let credentials = Self::credentials(&args)?;
        let source = OneLoginApps::new(&args.api_url, credentials, config.name_from)?;
        let executor = TerraformExecutor::new(config.executor, ctx.command.clone());

        let mut selector = SchemaSelector::builtin();
        selector.apply_overrides(&config.schemas);

        let settings = RunSettings {
            conversion,
            config,
            working_dir: args.workdir,
            auto_approve: args.auto_approve,
            id: args.id,
        };

        Self::run(ctx, &settings, &source, &executor, &selector)?;
        Ok(())
    }

    fn credentials(args: &ConvertArgs) -> Result<OneLoginCredentials, ConvertError> {
        match (&args.client_id, &args.client_secret) {
            (Some(client_id), Some(client_secret))
                if !client_id.is_empty() && !client_secret.is_empty() =>
            {
                Ok(OneLoginCredentials {
                    client_id: client_id.clone(),
                    client_secret: client_secret.clone(),
                })
            }
            _ => Err(ConvertError::Config(
                "OneLogin credentials are required: set ONELOGIN_CLIENT_ID and ONELOGIN_CLIENT_SECRET \
                 or pass --client-id and --client-secret"
                    .to_string(),
            )),
        }
    }

    /// Fetch, declare, import and rewrite the apps selected by `settings`
    ///
    /// Nothing is written before the IaC binary is found and the user has
    /// confirmed.
    pub fn run(
        ctx: &Context,
        settings: &RunSettings,
        source: &dyn AppSource,
        executor: &dyn IacExecutor,
        selector: &SchemaSelector,
    ) -> Result<RunOutcome> {
        let conversion = &settings.conversion;

        if !executor.check_installed()? {
            anyhow::bail!(
                "{} is not installed or not in PATH",
                executor.get_name()
            );
        }

        ctx.output.info(&format!(
            "Collecting apps from {} ({})...",
            source.provider(),
            conversion.source
        ));
        let apps = fetch_all(source, &conversion.query(settings.id))?;

        if apps.is_empty() {
            ctx.output.warning("No apps found, nothing to convert");
            return Ok(RunOutcome::NothingToConvert);
        }

        // A single-app fetch bypasses the listing filter
        if settings.id.is_some() && conversion.app_type != AppType::GenericApp {
            if let Some(app) = apps.iter().find(|app| AppType::of(app) != conversion.app_type) {
                anyhow::bail!(
                    "App {} is a {} app, not one of {}",
                    app.id,
                    AppType::of(app).tag(),
                    conversion.source
                );
            }
        }

        let (apps, duplicates) = unique_by_id(apps);
        if !duplicates.is_empty() {
            ctx.output.warning(&format!(
                "Listing returned {} app(s) more than once, converting each once: {}",
                duplicates.len(),
                duplicates
                    .iter()
                    .map(i64::to_string)
                    .collect::<Vec<_>>()
                    .join(", ")
            ));
        }

        let definitions = classify_all(&apps, source);

        ctx.output.section("Apps to convert");
        for (definition, app) in definitions.iter().zip(&apps) {
            ctx.output.key_value(&definition.address(), &app.summary());
        }

        if !settings.auto_approve && !Self::confirm(ctx, definitions.len(), &conversion.destination)? {
            ctx.output.warning("User aborted operation!");
            return Ok(RunOutcome::Aborted);
        }

        let source_dir = settings.source_dir();
        let source_file = source_dir.join(DECLARATION_FILE);

        Self::write_file(
            ctx,
            &source_file,
            &assemble_headers(&definitions, &[source.provider()]),
        )?;

        ctx.output.info(&format!(
            "Initializing {} with '{} init'",
            source_dir.display(),
            executor.get_name()
        ));
        executor.init(&source_dir)?;

        let total = definitions.len();
        for (index, definition) in definitions.iter().enumerate() {
            let address = definition.address();
            let import_id = definition
                .import_id()
                .with_context(|| format!("Resource name '{}' carries no id", definition.name))?;

            ctx.output.info(&format!(
                "Importing resource {}/{} ({})",
                index + 1,
                total,
                address
            ));
            executor.import(&source_dir, &address, import_id)?;
        }

        let instances = StateParser::from_file(&*ctx.fs, &source_dir.join(STATE_FILE))?;

        let source_document = convert(
            &instances,
            selector,
            Variant::Source,
            ProviderBlock::new(source.provider()),
        )?;
        Self::write_file(ctx, &source_file, &source_document)?;
        ctx.output.dimmed(&format!("Wrote {}", source_file.display()));

        let destination_provider = ProviderBlock::new(&conversion.destination_provider).with_params(
            settings
                .config
                .destination_provider
                .iter()
                .map(|(key, value)| (key.clone(), value.clone())),
        );
        let destination_document = convert(
            &instances,
            selector,
            Variant::Destination,
            destination_provider,
        )?;

        let destination_dir = settings.destination_dir();
        let destination_file = destination_dir.join(DECLARATION_FILE);
        Self::write_file(ctx, &destination_file, &destination_document)?;
        ctx.output
            .dimmed(&format!("Wrote {}", destination_file.display()));

        ctx.output.info(&format!(
            "Initializing {} with '{} init'",
            destination_dir.display(),
            executor.get_name()
        ));
        executor.init(&destination_dir)?;

        ctx.output.info(&format!(
            "Applying {} ({})",
            destination_dir.display(),
            conversion.destination
        ));
        executor.apply(&destination_dir)?;

        ctx.output.success(&format!(
            "Converted {} app(s) from {} to {}",
            total, conversion.source, conversion.destination
        ));

        Ok(RunOutcome::Completed { converted: total })
    }

    fn confirm(ctx: &Context, count: usize, destination: &str) -> Result<bool> {
        let answer = ctx.input.text(&format!(
            "This will convert {} apps to {}. Do you want to continue? (y/n):",
            count, destination
        ))?;

        let answer = answer.trim().to_lowercase();
        Ok(answer == "y" || answer == "yes")
    }

    fn write_file(ctx: &Context, path: &Path, contents: &str) -> Result<()> {
        let written = match path.parent() {
            Some(parent) => ctx
                .fs
                .create_dir_all(parent)
                .and_then(|_| ctx.fs.write(path, contents)),
            None => ctx.fs.write(path, contents),
        };

        written.map_err(|e| {
            ConvertError::FileSystem(format!("Failed to write {}: {:#}", path.display(), e)).into()
        })
    }
}

/// Keep the first occurrence of every app id, in listing order
///
/// Also returns the ids that were seen more than once.
fn unique_by_id(apps: Vec<RemoteResource>) -> (Vec<RemoteResource>, Vec<i64>) {
    let mut seen = HashSet::new();
    let mut duplicates = Vec::new();
    let mut unique = Vec::with_capacity(apps.len());

    for app in apps {
        if seen.insert(app.id) {
            unique.push(app);
        } else if !duplicates.contains(&app.id) {
            duplicates.push(app.id);
        }
    }

    (unique, duplicates)
}
