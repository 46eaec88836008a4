use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::Args;
use formcraft_spec::validate;

use super::{print_json, read_form, read_json};

#[derive(Args, Debug, Clone)]
pub struct ValidateArgs {
    /// Form JSON file
    #[arg(value_name = "FORM")]
    pub form: PathBuf,
    /// Flat answer object keyed by field id
    #[arg(long, value_name = "answers.json")]
    pub answers: PathBuf,
}

pub fn run(args: ValidateArgs) -> Result<()> {
    let form = read_form(&args.form)?;
    let answers = read_json(&args.answers)?;
    let result = validate(&form, &answers);
    print_json(&result)?;
    if !result.valid {
        bail!(
            "submission invalid: {} error(s), {} missing required, {} unknown field(s)",
            result.errors.len(),
            result.missing_required.len(),
            result.unknown_fields.len()
        );
    }
    Ok(())
}
