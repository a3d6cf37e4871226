//! `postlyzer score` - one post metric against the account average.

use postlyzer_config::Settings;
use postlyzer_export::format_percent;
use postlyzer_rollup::score::account_average;
use postlyzer_rollup::score_against_average;

use crate::exit_codes::EXIT_ERROR;
use crate::CliError;

fn resolve_average(average: Option<f64>, history: &[f64]) -> Result<f64, CliError> {
    match average {
        Some(avg) => Ok(avg),
        None => account_average(history).ok_or_else(|| {
            CliError::args("no account average given")
                .with_hint("pass --average N or --history a,b,c")
        }),
    }
}

pub fn cmd_score(
    settings: &Settings,
    value: f64,
    average: Option<f64>,
    history: Vec<f64>,
    json: bool,
) -> Result<(), CliError> {
    if !settings.features.scoring {
        return Err(CliError::disabled("scoring"));
    }

    let avg = resolve_average(average, &history)?;
    let score = score_against_average(value, avg);

    if json {
        let out = serde_json::to_string_pretty(&score)
            .map_err(|e| CliError::new(EXIT_ERROR, format!("JSON serialization error: {e}")))?;
        println!("{out}");
    } else {
        let sign = if score.delta_percent > 0.0 { "+" } else { "" };
        println!(
            "{} ({}{} vs account average {})",
            score.tier,
            sign,
            format_percent(Some(score.delta_percent)),
            score.account_average,
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_average_wins() {
        assert_eq!(resolve_average(Some(50.0), &[1.0, 2.0]).unwrap(), 50.0);
    }

    #[test]
    fn history_mean() {
        assert_eq!(resolve_average(None, &[80.0, 100.0, 120.0]).unwrap(), 100.0);
    }

    #[test]
    fn missing_average_is_usage_error() {
        let err = resolve_average(None, &[]).unwrap_err();
        assert_eq!(err.code, crate::exit_codes::EXIT_USAGE);
        assert!(err.hint.is_some());
    }
}
