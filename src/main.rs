fn main() {
    if let Err(err) = coursebot::cli::main() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
