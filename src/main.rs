fn main() {
    if let Err(e) = geminal::cli::main() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
