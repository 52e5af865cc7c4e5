//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

fn main() {
    if let Err(err) = change_merger_cli::run() {
        eprintln!("change-merger: {err}");
        std::process::exit(1);
    }
}
