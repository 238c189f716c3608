use std::process::ExitCode;

fn main() -> ExitCode {
    match alfred_keywords::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("alfred-keywords: {e:#}");
            ExitCode::FAILURE
        }
    }
}
