use std::process::ExitCode;

fn main() -> ExitCode {
    s3get_lib::run()
}
