use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::cmd::{
    self, normalize::NormalizeArgs, preview::PreviewArgs, remote::RemoteCommand,
    reorder::ReorderArgs, validate::ValidateArgs,
};
use crate::config::FormcraftConfig;
use crate::logging;

#[derive(Parser, Debug)]
#[command(
    name = "formcraft",
    about = "Author, reorder, preview and validate inspection forms",
    version,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Configuration file (defaults to FORMCRAFT_CONFIG or the user config dir)
    #[arg(long = "config", value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long = "log-filter", value_name = "FILTER", global = true)]
    log_filter: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render the live preview of a form
    Preview(PreviewArgs),
    /// Sort, renumber and stamp parent ids on a form
    Normalize(NormalizeArgs),
    /// Apply one drag-and-drop move and print the form
    Reorder(ReorderArgs),
    /// Validate a submission against a form
    Validate(ValidateArgs),
    /// Print the JSON Schema of the form model
    Schema,
    /// Talk to the forms backend
    #[command(subcommand)]
    Remote(RemoteCommand),
}

pub fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = FormcraftConfig::load(cli.config.as_deref()).context("loading configuration")?;
    logging::init(cli.log_filter.as_deref().unwrap_or(&config.logging.filter));
    match cli.command {
        Commands::Preview(args) => cmd::preview::run(args, &config),
        Commands::Normalize(args) => cmd::normalize::run(args),
        Commands::Reorder(args) => cmd::reorder::run(args),
        Commands::Validate(args) => cmd::validate::run(args),
        Commands::Schema => cmd::schema::run(),
        Commands::Remote(command) => {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
                .context("starting async runtime")?;
            runtime.block_on(cmd::remote::run(command, &config))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_flags_parse_after_the_subcommand() {
        let cli = Cli::try_parse_from([
            "formcraft",
            "preview",
            "form.json",
            "--format",
            "json",
            "--log-filter",
            "debug",
        ])
        .expect("parse");
        assert_eq!(cli.log_filter.as_deref(), Some("debug"));
        match cli.command {
            Commands::Preview(args) => {
                assert_eq!(args.form, PathBuf::from("form.json"));
                assert_eq!(args.format, cmd::preview::PreviewFormat::Json);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn reorder_requires_both_keys() {
        let err = Cli::try_parse_from(["formcraft", "reorder", "form.json", "--source", "3"])
            .expect_err("missing target");
        assert!(err.to_string().contains("--target"));
    }

    #[test]
    fn reorder_keys_accept_draft_form() {
        let cli = Cli::try_parse_from([
            "formcraft",
            "reorder",
            "form.json",
            "--source",
            "section-2",
            "--target",
            "section-1",
        ])
        .expect("parse");
        let Commands::Reorder(args) = cli.command else {
            panic!("expected reorder");
        };
        assert_eq!(args.source.to_string(), "section-2");
        assert_eq!(args.target.to_string(), "section-1");
    }

    #[test]
    fn remote_show_takes_numeric_id() {
        assert!(Cli::try_parse_from(["formcraft", "remote", "show", "abc"]).is_err());
        let cli = Cli::try_parse_from(["formcraft", "remote", "show", "12"]).expect("parse");
        assert!(matches!(
            cli.command,
            Commands::Remote(RemoteCommand::Show { id: 12 })
        ));
    }
}
