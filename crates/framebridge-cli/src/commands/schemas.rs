//! Schemas command - list the built-in schemas.

use colored::Colorize;
use framebridge::{Constraint, SchemaDefinition};

use crate::catalog;

pub fn run(json_output: bool, _verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let schemas = catalog::schemas();

    if json_output {
        let listing: Vec<&SchemaDefinition> = schemas.iter().map(|s| &**s).collect();
        println!("{}", serde_json::to_string_pretty(&listing)?);
        return Ok(());
    }

    for schema in &schemas {
        println!(
            "{} {}",
            schema.name.cyan().bold(),
            format!("({} columns)", schema.column_count()).dimmed()
        );
        if let Some(description) = &schema.description {
            println!("  {}", description);
        }
        for column in &schema.columns {
            let constraints: Vec<String> =
                column.constraints.iter().map(Constraint::name).collect();
            println!(
                "  {:<12} {:<6} {}{}",
                column.name.white(),
                column.dtype.label().yellow(),
                if column.nullable { "nullable " } else { "" },
                constraints.join(", ").dimmed()
            );
        }
        println!();
    }

    Ok(())
}
