use std::process::ExitCode;

fn main() -> ExitCode {
    match candypack::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            candypack::report_error(&err);
            ExitCode::FAILURE
        }
    }
}
