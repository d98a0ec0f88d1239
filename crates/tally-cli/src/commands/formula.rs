//! Formula command - evaluate a formula over aliased columns.

use std::path::PathBuf;

use colored::Colorize;
use tally::{AliasMap, FormulaResult, Tally};

use super::load;

pub fn run(
    tally: &Tally,
    file: PathBuf,
    formula: String,
    alias_args: Vec<String>,
    json_output: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let aliases = parse_aliases(&alias_args)?;
    let session = load(tally, &file)?;

    let result = session.evaluate_formula(&formula, &aliases);

    if json_output {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!("{} {}", "Formula".cyan().bold(), formula.white());
    for (alias, column) in &aliases {
        println!("  {} = {}", alias.yellow(), column);
    }
    println!();

    match result {
        FormulaResult::Scalar { value } => {
            println!("{} {}", "Result:".green().bold(), value.to_string().white().bold());
        }
        FormulaResult::Series {
            value,
            sum,
            count,
            min,
            max,
        } => {
            println!("{} column of {} values", "Result:".green().bold(), count);
            println!("  mean {}", value);
            println!("  sum  {}", sum);
            println!("  min  {}", min);
            println!("  max  {}", max);
        }
        FormulaResult::Error { message } => {
            // Evaluation errors are reported, not turned into a failing exit code.
            println!("{} {}", "Error:".red().bold(), message);
        }
    }

    Ok(())
}

/// Parse `alias=column` pairs. The column part may itself contain '='.
fn parse_aliases(args: &[String]) -> Result<AliasMap, Box<dyn std::error::Error>> {
    let mut aliases = AliasMap::new();
    for arg in args {
        let Some((alias, column)) = arg.split_once('=') else {
            return Err(format!("Invalid alias '{}': expected alias=column", arg).into());
        };
        let alias = alias.trim();
        if alias.is_empty() || column.is_empty() {
            return Err(format!("Invalid alias '{}': expected alias=column", arg).into());
        }
        if aliases.insert(alias.to_string(), column.to_string()).is_some() {
            return Err(format!("Alias '{}' given more than once", alias).into());
        }
    }
    Ok(aliases)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_aliases() {
        let args = vec!["rev=revenue".to_string(), "c=a=b".to_string()];
        let aliases = parse_aliases(&args).unwrap();
        assert_eq!(aliases.get("rev").map(String::as_str), Some("revenue"));
        assert_eq!(aliases.get("c").map(String::as_str), Some("a=b"));
    }

    #[test]
    fn test_parse_aliases_rejects_malformed() {
        assert!(parse_aliases(&["revenue".to_string()]).is_err());
        assert!(parse_aliases(&["=revenue".to_string()]).is_err());
        assert!(parse_aliases(&["a=x".to_string(), "a=y".to_string()]).is_err());
    }
}
