fn main() {
    vmtemplate::app::cli::run();
}
