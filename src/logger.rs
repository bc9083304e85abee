use env_logger::{Builder, Env, Target};
use log::info;
use std::fs::OpenOptions;
use std::io;
use std::path::Path;

/// Sets up the process logger. `RUST_LOG` overrides the default `info` level.
///
/// With `log_file` set, records are appended there instead of stderr so they
/// stay out of the prompt output.
pub fn init_logger(log_file: Option<&Path>) -> io::Result<()> {
    let mut builder = Builder::from_env(Env::default().default_filter_or("info"));
    builder.format_timestamp_secs().format_module_path(true);

    if let Some(path) = log_file {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        builder.target(Target::Pipe(Box::new(file)));
    }

    builder.init();
    info!("logging initialized");
    Ok(())
}
