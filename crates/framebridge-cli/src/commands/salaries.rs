//! Salaries command - average salary by department.

use std::path::PathBuf;

use colored::Colorize;
use framebridge::{Table, Validated};

use crate::catalog::{self, Employee};

use super::load_table;

pub fn run(
    file: Option<PathBuf>,
    json_output: bool,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let employees: Validated<Employee> = match &file {
        Some(path) => Validated::new(load_table(path)?)?,
        None => Validated::new(catalog::employee_sample())?,
    };

    if verbose {
        eprintln!("Validated {} employee records", employees.len());
    }

    let salaries = catalog::salary_by_department(&employees)?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&salaries)?);
        return Ok(());
    }

    println!("{}", "Average salary by department".cyan().bold());
    println!();
    if let Some(table) = salaries.table() {
        print_salaries(table);
    }

    Ok(())
}

fn print_salaries(table: &Table) {
    for row in table.rows() {
        let department = row
            .get("department")
            .map(ToString::to_string)
            .unwrap_or_default();
        let average = row.get("avg_salary").and_then(|v| v.as_f64());
        match average {
            Some(avg) => println!("  {:<14} {:>12.2}", department.white(), avg),
            None => println!("  {:<14} {:>12}", department.white(), "-".dimmed()),
        }
    }
}
