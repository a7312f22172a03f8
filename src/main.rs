fn main() {
    if let Err(err) = csv_slim::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
