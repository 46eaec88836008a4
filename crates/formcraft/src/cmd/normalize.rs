use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use formcraft_spec::normalize_form;

use super::{print_json, read_form};

#[derive(Args, Debug, Clone)]
pub struct NormalizeArgs {
    /// Form JSON file
    #[arg(value_name = "FORM")]
    pub form: PathBuf,
}

pub fn run(args: NormalizeArgs) -> Result<()> {
    let mut form = read_form(&args.form)?;
    normalize_form(&mut form);
    print_json(&form)
}
