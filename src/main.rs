use keyed_map::MapError;

fn main() -> Result<(), MapError> {
    keyed_map::cli::run()
}
