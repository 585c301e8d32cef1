//! Aspector CLI binary entrypoint.

fn main() {
    if let Err(err) = aspector_cli::app::run() {
        eprintln!("{}", err);
        std::process::exit(1);
    }
}
