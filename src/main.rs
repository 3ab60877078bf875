//! `hemmer-bridge-gen`: emit a bridge package from a provider schema.

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use tracing::{error, info, warn};

use hemmer_bridge_gen::schema::{Diagnostic, Provider};
use hemmer_bridge_gen::{
    generate_with_options, init_logging_with_default, render_with_options, terraform,
    validate_result, FormatterKind, GenerateError, GenerateOptions, DEFAULT_BRIDGE_CRATE,
};

/// Generate typed bridge entities and CRUD handlers from a provider schema.
#[derive(Parser, Debug)]
#[command(name = "hemmer-bridge-gen", version)]
struct Cli {
    /// Provider schema document
    #[arg(long, value_name = "FILE")]
    schema: PathBuf,

    /// Format of the schema document
    #[arg(long, value_enum, default_value_t = InputFormat::Native)]
    input_format: InputFormat,

    /// Provider source address to import (terraform input with several providers)
    #[arg(long, value_name = "SOURCE")]
    provider: Option<String>,

    /// Namespace every aggregate and handler is registered under
    #[arg(long)]
    namespace: String,

    /// Output file, or '-' for stdout
    #[arg(long, short, default_value = "-")]
    out: String,

    /// Crate path the generated code imports the bridge runtime from
    #[arg(long, default_value = DEFAULT_BRIDGE_CRATE)]
    bridge_crate: String,

    /// Formatter applied to the generated source
    #[arg(long, value_enum, default_value_t = FormatterArg::Prettyplease)]
    formatter: FormatterArg,

    /// Default log level when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum InputFormat {
    /// The generator's own JSON schema form
    Native,
    /// Output of `terraform providers schema -json`
    Terraform,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum FormatterArg {
    Prettyplease,
    Rustfmt,
    Verbatim,
}

impl From<FormatterArg> for FormatterKind {
    fn from(arg: FormatterArg) -> Self {
        match arg {
            FormatterArg::Prettyplease => FormatterKind::PrettyPlease,
            FormatterArg::Rustfmt => FormatterKind::Rustfmt,
            FormatterArg::Verbatim => FormatterKind::Verbatim,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging_with_default(&cli.log_level);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "Generation failed");
            ExitCode::FAILURE
        },
    }
}

fn run(cli: &Cli) -> Result<(), GenerateError> {
    let provider = load(cli)?;
    check(&provider)?;

    let options = GenerateOptions::new(&cli.namespace)
        .with_bridge_crate(&cli.bridge_crate)
        .with_formatter(cli.formatter.into());

    if cli.out == "-" {
        let source = render_with_options(&provider, &options)?;
        let mut stdout = std::io::stdout().lock();
        stdout
            .write_all(source.as_bytes())
            .and_then(|()| stdout.flush())
            .map_err(|err| GenerateError::io("<stdout>", err))?;
    } else {
        generate_with_options(&provider, &options, &cli.out)?;
        info!(path = %cli.out, "Done");
    }
    Ok(())
}

fn load(cli: &Cli) -> Result<Provider, GenerateError> {
    match cli.input_format {
        InputFormat::Native => {
            if cli.provider.is_some() {
                warn!("--provider only applies to terraform input; ignoring");
            }
            Provider::from_file(&cli.schema)
        },
        InputFormat::Terraform => terraform::from_file(&cli.schema, cli.provider.as_deref()),
    }
}

/// Log warnings; refuse to generate when any diagnostic is an error.
fn check(provider: &Provider) -> Result<(), GenerateError> {
    match validate_result(provider) {
        Ok(warnings) => {
            warnings.iter().for_each(log_diagnostic);
            Ok(())
        },
        Err(diagnostics) => {
            diagnostics.iter().for_each(log_diagnostic);
            let errors = diagnostics.iter().filter(|d| d.is_error()).count();
            Err(GenerateError::Input(format!(
                "Schema has {} error(s); nothing generated",
                errors
            )))
        },
    }
}

fn log_diagnostic(diagnostic: &Diagnostic) {
    let attribute = diagnostic.attribute.as_deref().unwrap_or("");
    let detail = diagnostic.detail.as_deref().unwrap_or("");
    if diagnostic.is_error() {
        error!(attribute, detail, "{}", diagnostic.summary);
    } else {
        warn!(attribute, detail, "{}", diagnostic.summary);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from([
            "hemmer-bridge-gen",
            "--schema",
            "schema.json",
            "--namespace",
            "Example",
        ]);
        assert_eq!(cli.input_format, InputFormat::Native);
        assert_eq!(cli.out, "-");
        assert_eq!(cli.bridge_crate, DEFAULT_BRIDGE_CRATE);
        assert_eq!(FormatterKind::from(cli.formatter), FormatterKind::PrettyPlease);
    }

    #[test]
    fn test_terraform_flags() {
        let cli = Cli::parse_from([
            "hemmer-bridge-gen",
            "--schema",
            "schema.json",
            "--namespace",
            "Example",
            "--input-format",
            "terraform",
            "--provider",
            "hashicorp/aws",
            "--formatter",
            "verbatim",
            "--out",
            "out/generated.rs",
        ]);
        assert_eq!(cli.input_format, InputFormat::Terraform);
        assert_eq!(cli.provider.as_deref(), Some("hashicorp/aws"));
        assert_eq!(FormatterKind::from(cli.formatter), FormatterKind::Verbatim);
        assert_eq!(cli.out, "out/generated.rs");
    }

    #[test]
    fn test_run_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let schema = dir.path().join("schema.json");
        std::fs::write(
            &schema,
            r#"{"resources": {"widget": {"schema": {"name": {"type": "string", "required": true}}}}}"#,
        )
        .unwrap();
        let out = dir.path().join("gen").join("generated.rs");

        let cli = Cli::parse_from([
            "hemmer-bridge-gen",
            "--schema",
            schema.to_str().unwrap(),
            "--namespace",
            "Example",
            "--out",
            out.to_str().unwrap(),
        ]);
        run(&cli).unwrap();
        assert!(std::fs::read_to_string(&out).unwrap().contains("pub struct Widget {"));
    }

    #[test]
    fn test_run_rejects_invalid_schema() {
        let dir = tempfile::tempdir().unwrap();
        let schema = dir.path().join("schema.json");
        std::fs::write(
            &schema,
            r#"{"resources": {"widget": {"schema": {"items": {"type": "list"}}}}}"#,
        )
        .unwrap();
        let out = dir.path().join("generated.rs");

        let cli = Cli::parse_from([
            "hemmer-bridge-gen",
            "--schema",
            schema.to_str().unwrap(),
            "--namespace",
            "Example",
            "--out",
            out.to_str().unwrap(),
        ]);
        assert!(matches!(run(&cli), Err(GenerateError::Input(_))));
        assert!(!out.exists());
    }
}
