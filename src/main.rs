fn main() {
    env_logger::init();
    if let Err(err) = schema_graph::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
