fn main() {
    if let Err(err) = waterfall_rs::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
