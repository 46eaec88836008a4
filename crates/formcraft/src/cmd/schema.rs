use anyhow::Result;
use formcraft_spec::FormSpec;
use schemars::schema_for;

use super::print_json;

pub fn run() -> Result<()> {
    print_json(&schema_for!(FormSpec))
}
