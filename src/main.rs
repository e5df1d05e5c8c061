use anyhow::Result;
use clap::{Arg, Command};

fn main() -> Result<()> {
    let matches = Command::new("handleit")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Watches a process's GDI handle count and warns before it hits the quota")
        .arg(
            Arg::new("process")
                .value_name("PROCESS")
                .help("Image name of the process to watch (e.g. explorer.exe)")
                .required(true),
        )
        .get_matches();

    handleit::init_logging();

    handleit::commands::watch(&matches)
}
