use serde::Serialize;

use super::ctx::CliError;

pub fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    let out = serde_json::to_string_pretty(value)
        .map_err(|e| CliError::Output(e.to_string()))?;
    println!("{out}");
    Ok(())
}

pub fn print_lines(lines: &[String]) {
    for line in lines {
        eprintln!("{line}");
    }
}
