use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Subcommand;
use formcraft_spec::FormId;

use super::{print_json, read_form};
use crate::builder::BuilderSession;
use crate::catalog::FormCatalog;
use crate::config::FormcraftConfig;
use crate::context::BuilderContext;
use crate::http::HttpFormBackend;
use crate::notify::TracingNotifier;

#[derive(Subcommand, Debug, Clone)]
pub enum RemoteCommand {
    /// List the organization's forms
    List,
    /// Print one stored form
    Show {
        #[arg(value_name = "ID")]
        id: FormId,
    },
    /// Create or update a form from a JSON file
    Push {
        #[arg(value_name = "FORM")]
        form: PathBuf,
    },
    /// Delete a stored form
    Delete {
        #[arg(value_name = "ID")]
        id: FormId,
    },
}

pub async fn run(command: RemoteCommand, config: &FormcraftConfig) -> Result<()> {
    let backend = HttpFormBackend::new(&config.backend.base_url, config.backend.timeout())
        .with_context(|| format!("backend url `{}`", config.backend.base_url))?;
    let ctx = BuilderContext::new(Arc::new(backend), Arc::new(TracingNotifier));
    match command {
        RemoteCommand::List => {
            let mut catalog = FormCatalog::new(&ctx);
            for form in catalog.refresh().await? {
                let id = form.id.map(|id| id.to_string()).unwrap_or_else(|| "-".into());
                println!(
                    "{id}\t{}\t{} section(s), {} field(s)",
                    form.name,
                    form.sections.len(),
                    form.field_count()
                );
            }
            Ok(())
        }
        RemoteCommand::Show { id } => {
            let form = FormCatalog::new(&ctx).open(id).await?;
            print_json(&form)
        }
        RemoteCommand::Push { form } => {
            let form = read_form(&form)?;
            let mut session = BuilderSession::new(ctx);
            session.select(Some(form));
            let outcome = session.save().await?;
            tracing::debug!(outcome = ?outcome, "push finished");
            match session.form() {
                Some(form) => print_json(form),
                None => Ok(()),
            }
        }
        RemoteCommand::Delete { id } => {
            let form = FormCatalog::new(&ctx).open(id).await?;
            let mut session = BuilderSession::new(ctx);
            session.select(Some(form));
            let deleted = session.delete_form().await?;
            println!("deleted form {deleted}");
            Ok(())
        }
    }
}
