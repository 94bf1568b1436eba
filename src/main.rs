fn main() -> std::process::ExitCode {
    mdr_letters_lib::run()
}
