//! Print an example configuration

use anyhow::Result;

pub fn run() -> Result<()> {
    print!("{}", cli_lib::config::example_config());
    Ok(())
}
