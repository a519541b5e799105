use crate::cli::args::CliArgs;
use crate::output::OutputFormat;
use crate::table::SortKey;

pub fn validate(args: &CliArgs) -> Result<(), String> {
    if let Some(raw) = args.sort.as_deref() {
        raw.parse::<SortKey>()
            .map_err(|e| format!("invalid --sort: {e}"))?;
    }
    if args.page == Some(0) {
        return Err("invalid page, expected positive integer".to_string());
    }
    if args.page_size == Some(0) {
        return Err("invalid page-size, expected positive integer".to_string());
    }
    if args.timeout == Some(0) {
        return Err("invalid timeout, expected positive number of seconds".to_string());
    }
    if let Some(raw) = args.output_format.as_deref() {
        if OutputFormat::parse(raw).is_none() {
            return Err(format!(
                "invalid --output-format '{raw}', expected text, json, csv, or html"
            ));
        }
    }
    Ok(())
}
