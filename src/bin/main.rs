//! PDF Remote Signer CLI
//!
//! Signs PDFs through the document engine and a remote signing service,
//! verifies signed PDFs, and manages the configuration file.

use clap::{Parser, Subcommand, ValueEnum};
use miette::{miette, Context, IntoDiagnostic, Result};
use pdf_remote_signer::{
    config::{ConfigManager, ExportFormat},
    FieldFormat, NativeEngine, RemoteDigestSigner, RevocationHttpConfig, SignRequest,
    SignWorkflow, SignatureKind, SignerConfiguration, SignerOptions, VerifyWorkflow, Visibility,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "pdf-remote-signer")]
#[command(about = "Sign PDFs with a remote signing service and embed OCSP/CRL evidence")]
#[command(long_about = "
PDF Remote Signer - PDF signing with an external key holder

EXAMPLES:
    # Invisible signature, no revocation evidence
    pdf-remote-signer sign in.pdf out.pdf --signer-url https://sign.example.com/api/sign

    # Visible image signature on page 2 with OCSP/CRL embedding
    pdf-remote-signer sign in.pdf out.pdf --visibility image --image stamp.png \\
        --page 2 --x 100 --y 100 --width 120 --height 60 --dss

    # Pass options through to the signing service
    pdf-remote-signer sign in.pdf out.pdf -O profile=qualified -O tenant=acme

    # Verify a signed document
    pdf-remote-signer verify out.pdf

ENVIRONMENT VARIABLES:
    PDF_SIGNER_URL      Signing service URL (overrides config)
    PDF_SIGNER_TOKEN    Bearer token for the signing service
    RUST_LOG            Logging level (debug, info, warn, error)
")]
#[command(version)]
struct Cli {
    /// Configuration file (defaults to the user config directory)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign a PDF
    Sign(SignArgs),

    /// Verify the signatures of a PDF
    Verify {
        /// Signed PDF to verify
        #[arg(value_name = "FILE")]
        file: String,

        /// Engine library directory (overrides config)
        #[arg(long, value_name = "DIR")]
        lib_dir: Option<PathBuf>,
    },

    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(clap::Args)]
struct SignArgs {
    /// PDF to sign
    #[arg(value_name = "INPUT")]
    input: String,

    /// Signed PDF to write
    #[arg(value_name = "OUTPUT")]
    output: String,

    /// Image used by image visibility modes
    #[arg(long, value_name = "PATH")]
    image: Option<String>,

    /// URL encoded by QR visibility modes
    #[arg(long)]
    url: Option<String>,

    #[arg(long)]
    location: Option<String>,

    #[arg(long)]
    reason: Option<String>,

    #[arg(long = "contact")]
    contact_info: Option<String>,

    /// Signature field name
    #[arg(long)]
    field_id: Option<String>,

    /// Anchor text for the *-from-char visibility modes
    #[arg(long)]
    character: Option<String>,

    /// signature | seal
    #[arg(long = "kind")]
    signature_kind: Option<SignatureKind>,

    #[arg(long)]
    page: Option<i32>,

    /// adbe | pades
    #[arg(long)]
    format: Option<FieldFormat>,

    /// invisible | image | qr | image-from-char | qr-from-char
    #[arg(long)]
    visibility: Option<Visibility>,

    #[arg(long)]
    x: Option<f64>,

    #[arg(long)]
    y: Option<f64>,

    #[arg(long)]
    width: Option<f64>,

    #[arg(long)]
    height: Option<f64>,

    /// Fetch OCSP/CRL evidence and embed it for long-term validation
    #[arg(long)]
    dss: bool,

    /// Signing service URL (overrides config)
    #[arg(long, env = "PDF_SIGNER_URL", value_name = "URL")]
    signer_url: Option<String>,

    /// Bearer token for the signing service
    #[arg(long, env = "PDF_SIGNER_TOKEN", hide_env_values = true)]
    signer_token: Option<String>,

    /// Option forwarded to the signing service (repeatable)
    #[arg(short = 'O', long = "signer-option", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    signer_options: Vec<(String, String)>,

    /// Engine library directory (overrides config)
    #[arg(long, value_name = "DIR")]
    lib_dir: Option<PathBuf>,
}

impl SignArgs {
    fn to_request(&self) -> SignRequest {
        SignRequest {
            input_path: self.input.clone(),
            output_path: self.output.clone(),
            image_path: self.image.clone(),
            url: self.url.clone(),
            location: self.location.clone(),
            reason: self.reason.clone(),
            contact_info: self.contact_info.clone(),
            field_id: self.field_id.clone(),
            character: self.character.clone(),
            signature_kind: self.signature_kind,
            page: self.page,
            field_format: self.format,
            visibility: self.visibility,
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
            embed_revocation: Some(self.dss),
        }
    }
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Create default configuration file
    Init,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g. `signing_service.url`)
        key: String,
        /// Configuration value
        value: String,
    },

    /// Export configuration
    Export {
        /// Export format
        #[arg(short, long, value_enum, default_value = "toml")]
        format: ExportFormatArg,
        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Import configuration
    Import {
        /// Configuration file to import
        file: PathBuf,
        /// Import format
        #[arg(short, long, value_enum, default_value = "toml")]
        format: ExportFormatArg,
    },
}

#[derive(ValueEnum, Clone, Copy)]
enum ExportFormatArg {
    Toml,
    Json,
    Yaml,
}

impl From<ExportFormatArg> for ExportFormat {
    fn from(arg: ExportFormatArg) -> Self {
        match arg {
            ExportFormatArg::Toml => ExportFormat::Toml,
            ExportFormatArg::Json => ExportFormat::Json,
            ExportFormatArg::Yaml => ExportFormat::Yaml,
        }
    }
}

fn parse_key_value(s: &str) -> std::result::Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got `{s}`"))?;
    if key.is_empty() {
        return Err(format!("empty key in `{s}`"));
    }
    Ok((key.to_string(), value.to_string()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let config_manager = match &cli.config {
        Some(path) => ConfigManager::with_path(path),
        None => ConfigManager::new().into_diagnostic()?,
    };

    match cli.command {
        Commands::Sign(args) => {
            let code = handle_sign_command(&config_manager, args).await?;
            if code != 0 {
                std::process::exit(code);
            }
        }
        Commands::Verify { file, lib_dir } => {
            handle_verify_command(&config_manager, &file, lib_dir)?;
        }
        Commands::Config(config_cmd) => {
            handle_config_command(&config_manager, config_cmd)?;
        }
    }

    Ok(())
}

fn load_engine(config: &SignerConfiguration, lib_dir: Option<PathBuf>) -> Result<NativeEngine> {
    let dir = lib_dir.unwrap_or_else(|| PathBuf::from(&config.library_dir));
    NativeEngine::load_from_dir(&dir, &config.engine_library)
        .into_diagnostic()
        .with_context(|| format!("Failed to load document engine from {}", dir.display()))
}

async fn handle_sign_command(config_manager: &ConfigManager, args: SignArgs) -> Result<i32> {
    let config = config_manager.load_or_default().into_diagnostic()?;

    let mut signing_service = config.signing_service.clone();
    if let Some(url) = &args.signer_url {
        signing_service.url = Some(url.clone());
    }
    let mut remote_config = signing_service.remote_signer_config().ok_or_else(|| {
        miette!("No signing service configured. Pass --signer-url or run 'config set signing_service.url <URL>'")
    })?;
    if let Some(token) = &args.signer_token {
        remote_config = remote_config.with_auth_token(token.clone());
    }
    let signer = RemoteDigestSigner::new(remote_config)
        .into_diagnostic()
        .context("Failed to create signing service client")?;

    let engine = load_engine(&config, args.lib_dir.clone())?;
    let http_config = RevocationHttpConfig::from(&config.revocation);
    let options: SignerOptions = args.signer_options.iter().cloned().collect();

    let workflow = SignWorkflow::with_http_config(Arc::new(engine), Arc::new(signer), &http_config)
        .into_diagnostic()?
        .with_signer_options(options)
        .with_signing_timeout(signing_service.signing_timeout());

    let result = workflow.sign(&args.to_request()).await;
    println!("{}", result.to_json().into_diagnostic()?);
    Ok(result.response_code)
}

fn handle_verify_command(
    config_manager: &ConfigManager,
    file: &str,
    lib_dir: Option<PathBuf>,
) -> Result<()> {
    let config = config_manager.load_or_default().into_diagnostic()?;
    let engine = load_engine(&config, lib_dir)?;
    let verdict = VerifyWorkflow::new(Arc::new(engine))
        .run(file)
        .into_diagnostic()
        .with_context(|| format!("Failed to verify {file}"))?;
    println!("{verdict}");
    Ok(())
}

fn handle_config_command(config_manager: &ConfigManager, config_cmd: ConfigCommands) -> Result<()> {
    match config_cmd {
        ConfigCommands::Show => match config_manager.load() {
            Ok(config) => {
                println!("Current Configuration:");
                println!("  Library directory: {}", config.library_dir);
                println!("  Engine library: {}", config.engine_library);
                println!(
                    "  Signing service: {}",
                    config.signing_service.url.as_deref().unwrap_or("(not set)")
                );
                println!(
                    "  Signing timeout: {}s",
                    config.signing_service.signing_timeout_seconds
                );
                println!(
                    "  Revocation timeout: {}s (connect {}s)",
                    config.revocation.timeout_seconds, config.revocation.connect_timeout_seconds
                );
                println!(
                    "  Concurrent revocation fetches: {}",
                    config.revocation.max_concurrent_fetches
                );
                println!(
                    "  Configuration file: {}",
                    config_manager.config_path().display()
                );
            }
            Err(e) => {
                log::debug!("Configuration not loaded: {e}");
                println!("No configuration file found. Use 'config init' to create one.");
            }
        },

        ConfigCommands::Init => {
            config_manager.load_or_create_default().into_diagnostic()?;
            println!(
                "Configuration initialized: {}",
                config_manager.config_path().display()
            );
        }

        ConfigCommands::Set { key, value } => {
            config_manager.update_value(&key, &value).into_diagnostic()?;
            println!("Configuration updated: {key} = {value}");
        }

        ConfigCommands::Export { format, output } => {
            let content = config_manager
                .export_config(format.into())
                .into_diagnostic()?;

            if let Some(output_path) = output {
                std::fs::write(&output_path, content).into_diagnostic()?;
                println!("Configuration exported to: {}", output_path.display());
            } else {
                println!("{content}");
            }
        }

        ConfigCommands::Import { file, format } => {
            let content = std::fs::read_to_string(&file).into_diagnostic()?;
            config_manager
                .import_config(&content, format.into())
                .into_diagnostic()?;
            println!("Configuration imported from: {}", file.display());
        }
    }

    Ok(())
}
