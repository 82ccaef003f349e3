// Main entry point that forwards to the gridmap-forge library
fn main() {
    // Exit with the same code as the app
    std::process::exit(match gridmap_forge::main() {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Error: {e:#}");
            1
        }
    });
}
