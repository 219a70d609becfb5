#[macro_use]
extern crate lazy_static;
extern crate log;
extern crate log4rs;

#[macro_use]
mod macros;
mod cli;
mod colormap;
mod convert;
mod dataset;
mod example;
mod inspect;
#[cfg(test)]
mod test_utils;
mod tfrecord;
mod utils;

use anyhow::{anyhow, Result};
use convert::options::ConvertOptions;
use std::path::Path;

fn main() -> Result<()> {
    let matches = cli::build_app().get_matches();
    let log_config = matches
        .value_of("log-config")
        .unwrap_or(cli::DEFAULT_LOG_CONFIG);
    log4rs::init_file(log_config, Default::default())?;

    match matches.subcommand() {
        ("convert", Some(args)) => {
            let opts = ConvertOptions::new(args)?;
            convert::run(&opts)?;
        }
        ("inspect", Some(args)) => {
            let path = Path::new(
                args.value_of("record-file")
                    .ok_or_else(|| anyhow!("Missing record file"))?,
            );
            let summary = inspect::inspect(path)?;
            inspect::log_summary(path, &summary);
        }
        (name, _) => return Err(anyhow!("Unknown subcommand {}", name)),
    }

    Ok(())
}
