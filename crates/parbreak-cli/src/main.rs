#![forbid(unsafe_code)]

fn main() {
    parbreak_cli::init_tracing();
    if let Err(error) = parbreak_cli::run_from_env() {
        eprintln!("parbreak: {error}");
        std::process::exit(error.exit_code());
    }
}
