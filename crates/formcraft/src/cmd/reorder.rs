use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::Args;
use formcraft_spec::SortKey;
use tracing::info;

use super::{print_json, read_form};
use crate::builder::BuilderSession;
use crate::builder::dnd::{ReorderGestures, ReorderOutcome};
use crate::context::BuilderContext;

#[derive(Args, Debug, Clone)]
pub struct ReorderArgs {
    /// Form JSON file
    #[arg(value_name = "FORM")]
    pub form: PathBuf,
    /// Key of the dragged item (`12`, `section-2`, `field-3`)
    #[arg(long, value_name = "KEY")]
    pub source: SortKey,
    /// Key of the item it is dropped on
    #[arg(long, value_name = "KEY")]
    pub target: SortKey,
}

pub fn run(args: ReorderArgs) -> Result<()> {
    let form = read_form(&args.form)?;
    let mut session = BuilderSession::new(BuilderContext::in_memory());
    session.select(Some(form));
    if session.on_drag_start(args.source).is_none() {
        bail!("no form loaded");
    }
    let outcome = session.on_drag_end(&args.source, Some(&args.target));
    match &outcome {
        ReorderOutcome::Ignored => info!(
            source = %args.source,
            target = %args.target,
            "drop ignored; form unchanged"
        ),
        changed => info!(outcome = ?changed, "reordered"),
    }
    match session.form() {
        Some(form) => print_json(form),
        None => bail!("no form loaded"),
    }
}
