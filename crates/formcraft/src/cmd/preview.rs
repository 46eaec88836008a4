use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Args, ValueEnum};
use formcraft_spec::{JsonFrontend, PreviewFrontend, TextFrontend};

use super::{print_json, read_form, read_json};
use crate::config::FormcraftConfig;
use crate::context::PreviewContext;
use crate::preview::{DirectoryUploader, PreviewSession};

#[derive(Args, Debug, Clone)]
pub struct PreviewArgs {
    /// Form JSON file
    #[arg(value_name = "FORM")]
    pub form: PathBuf,
    /// Initial answers keyed by field id
    #[arg(long, value_name = "answers.json")]
    pub answers: Option<PathBuf>,
    #[arg(long, value_enum, default_value = "text")]
    pub format: PreviewFormat,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewFormat {
    Text,
    Json,
}

pub fn run(args: PreviewArgs, config: &FormcraftConfig) -> Result<()> {
    let form = read_form(&args.form)?;
    let uploader = DirectoryUploader::new(config.upload.output_dir.clone());
    let ctx = PreviewContext::new(Arc::new(uploader)).with_upload_config(&config.upload);
    let mut session = PreviewSession::new(ctx, Some(form));
    if let Some(path) = &args.answers {
        session.seed(&read_json(path)?);
    }
    let payload = session.payload();
    match args.format {
        PreviewFormat::Text => {
            println!("{}", TextFrontend.render(&payload));
            Ok(())
        }
        PreviewFormat::Json => print_json(&JsonFrontend.render(&payload)),
    }
}
