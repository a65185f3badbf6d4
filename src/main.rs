fn main() {
    std::process::exit(energy_directory_lib::run());
}
