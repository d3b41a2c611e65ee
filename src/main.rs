//! NanoJS entry point.

fn main() {
    if let Err(e) = nanojs::cli::run_cli() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
