fn main() {
    if let Err(err) = kpi_merge::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
