mod host;

use clap::Parser;

fn main() {
    let cli = host::Cli::parse();
    if let Err(err) = host::run(cli) {
        eprintln!("error: {err:?}");
        std::process::exit(1);
    }
}
