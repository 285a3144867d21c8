fn main() {
    if let Err(err) = routeplot::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
