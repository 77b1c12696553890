//! Validate command - check a data file against a built-in schema.

use std::path::PathBuf;

use colored::Colorize;
use framebridge::{SchemaValidator, ValidatorConfig};

use crate::catalog;

use super::load_table;

pub fn run(
    file: PathBuf,
    schema_name: String,
    json_output: bool,
    max_failures: usize,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let schema = catalog::find(&schema_name).ok_or_else(|| {
        format!(
            "Unknown schema '{}'. Run 'framebridge schemas' to list them.",
            schema_name
        )
    })?;

    let table = load_table(&file)?;
    if verbose {
        eprintln!(
            "Loaded {} rows x {} columns from {}",
            table.row_count(),
            table.column_count(),
            file.display()
        );
    }

    let validator = SchemaValidator::with_config(ValidatorConfig {
        max_failure_cases: max_failures,
    });
    let result = validator.validate_all(&table, &schema);

    if json_output {
        let report = match &result {
            Ok(validated) => serde_json::json!({
                "schema": schema.name,
                "valid": true,
                "rows": validated.row_count(),
                "violations": [],
            }),
            Err(violations) => serde_json::json!({
                "schema": schema.name,
                "valid": false,
                "rows": table.row_count(),
                "violations": violations,
            }),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        match &result {
            Ok(validated) => println!(
                "{} {} rows satisfy {}",
                "✓".green().bold(),
                validated.row_count(),
                schema.name.cyan()
            ),
            Err(violations) => {
                println!(
                    "{} {} violation(s) of {}",
                    "✗".red().bold(),
                    violations.len(),
                    schema.name.cyan()
                );
                for violation in violations {
                    println!(
                        "  {} {}",
                        violation.column.white().bold(),
                        violation.check.name().yellow()
                    );
                    for case in &violation.failure_cases {
                        match case.row {
                            Some(row) => println!("      row {}: {}", row, case.value),
                            None => println!("      {}", case.value),
                        }
                    }
                }
            }
        }
    }

    match result {
        Ok(_) => Ok(()),
        Err(violations) => Err(format!(
            "{} failed validation against {} ({} violation(s))",
            file.display(),
            schema.name,
            violations.len()
        )
        .into()),
    }
}
