use std::process::ExitCode;

fn main() -> ExitCode {
    match llm_unit_economics::app::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(err.exit_code())
        }
    }
}
