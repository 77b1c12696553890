//! Validator for checking tables against a schema definition.

use chrono::NaiveDate;
use indexmap::IndexMap;
use regex::Regex;

use crate::schema::{ColumnSpec, Constraint, DataType, SchemaDefinition};
use crate::table::{Table, Value};

use super::violation::{CheckKind, FailureCase, SchemaViolation};

/// Serialized form of `Value::Date`.
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Validator configuration.
#[derive(Debug, Clone)]
pub struct ValidatorConfig {
    /// Maximum failure cases kept per violation.
    pub max_failure_cases: usize,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            max_failure_cases: 10,
        }
    }
}

/// Checks tables against schema definitions, coercing column types where the
/// schema asks for it.
#[derive(Debug, Clone, Default)]
pub struct SchemaValidator {
    config: ValidatorConfig,
}

impl SchemaValidator {
    /// Create a validator with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a validator with custom configuration.
    pub fn with_config(config: ValidatorConfig) -> Self {
        Self { config }
    }

    /// Validate `table`, stopping at the first violation.
    ///
    /// On success returns the validated table, with coerced columns replaced.
    pub fn validate(
        &self,
        table: &Table,
        schema: &SchemaDefinition,
    ) -> Result<Table, SchemaViolation> {
        let (validated, mut violations) = self.run(table, schema, true);
        if violations.is_empty() {
            Ok(validated)
        } else {
            Err(violations.swap_remove(0))
        }
    }

    /// Validate `table`, collecting every violation.
    pub fn validate_all(
        &self,
        table: &Table,
        schema: &SchemaDefinition,
    ) -> Result<Table, Vec<SchemaViolation>> {
        let (validated, violations) = self.run(table, schema, false);
        if violations.is_empty() {
            Ok(validated)
        } else {
            Err(violations)
        }
    }

    fn run(
        &self,
        table: &Table,
        schema: &SchemaDefinition,
        stop_at_first: bool,
    ) -> (Table, Vec<SchemaViolation>) {
        let mut output = table.clone();
        let mut violations = Vec::new();

        if schema.strict {
            for name in table.column_names() {
                if schema.column(name).is_none() {
                    violations.push(SchemaViolation::new(
                        &schema.name,
                        name,
                        CheckKind::ColumnInSchema,
                        Vec::new(),
                        0,
                    ));
                    if stop_at_first {
                        return (output, violations);
                    }
                }
            }
        }

        for column in &schema.columns {
            let found = self.check_column(table, schema, column, &mut output);
            if !found.is_empty() {
                violations.extend(found);
                if stop_at_first {
                    break;
                }
            }
        }

        log::debug!(
            "validated {} rows against schema '{}': {} violation(s)",
            table.row_count(),
            schema.name,
            violations.len()
        );

        (output, violations)
    }

    /// Check one column, writing coerced values into `output`.
    fn check_column(
        &self,
        table: &Table,
        schema: &SchemaDefinition,
        column: &ColumnSpec,
        output: &mut Table,
    ) -> Vec<SchemaViolation> {
        let Some(raw) = table.column(&column.name) else {
            return vec![SchemaViolation::new(
                &schema.name,
                &column.name,
                CheckKind::ColumnInTable,
                Vec::new(),
                0,
            )];
        };

        let values: Vec<Value> = if schema.coerce || column.coerce {
            let mut coerced = Vec::with_capacity(raw.len());
            let mut failures = Vec::new();
            for (row, value) in raw.iter().enumerate() {
                match column.dtype.coerce(value) {
                    Some(v) => coerced.push(v),
                    None => failures.push(row),
                }
            }
            if !failures.is_empty() {
                return vec![self.violation(
                    schema,
                    column,
                    CheckKind::Coerce {
                        dtype: column.dtype,
                    },
                    raw,
                    &failures,
                )];
            }
            output.replace_column(&column.name, coerced.clone());
            coerced
        } else if let Some(decoded) = decode_serialized_dates(column.dtype, raw) {
            output.replace_column(&column.name, decoded.clone());
            decoded
        } else {
            raw.to_vec()
        };

        let wrong_type: Vec<usize> = rows_where(&values, |v| !column.dtype.matches(v));
        if !wrong_type.is_empty() {
            return vec![self.violation(
                schema,
                column,
                CheckKind::Dtype {
                    dtype: column.dtype,
                },
                &values,
                &wrong_type,
            )];
        }

        let mut violations = Vec::new();

        if !column.nullable {
            let nulls = rows_where(&values, Value::is_null);
            if !nulls.is_empty() {
                violations.push(self.violation(
                    schema,
                    column,
                    CheckKind::NotNullable,
                    &values,
                    &nulls,
                ));
            }
        }

        for constraint in &column.constraints {
            let failures = match constraint {
                Constraint::Range { min, max } => find_out_of_range(&values, *min, *max),
                Constraint::GreaterThan { value } => {
                    rows_where(&values, |v| !v.is_null() && v.as_f64().is_none_or(|n| n <= *value))
                }
                Constraint::LessThan { value } => {
                    rows_where(&values, |v| !v.is_null() && v.as_f64().is_none_or(|n| n >= *value))
                }
                Constraint::SetMembership { values: expected } => {
                    find_unexpected_values(&values, expected)
                }
                Constraint::Unique => find_duplicates(&values),
                Constraint::Pattern { value } => match Regex::new(&format!("^(?:{})$", value)) {
                    Ok(regex) => find_pattern_mismatches(&values, &regex),
                    Err(e) => {
                        log::debug!("invalid pattern '{}' on column '{}': {}", value, column.name, e);
                        // An unusable pattern fails every non-null value
                        rows_where(&values, |v| !v.is_null())
                    }
                },
                Constraint::Length { min, max } => find_length_violations(&values, *min, *max),
            };

            if !failures.is_empty() {
                violations.push(self.violation(
                    schema,
                    column,
                    CheckKind::Constraint {
                        constraint: constraint.clone(),
                    },
                    &values,
                    &failures,
                ));
            }
        }

        violations
    }

    fn violation(
        &self,
        schema: &SchemaDefinition,
        column: &ColumnSpec,
        check: CheckKind,
        values: &[Value],
        rows: &[usize],
    ) -> SchemaViolation {
        let cases = rows
            .iter()
            .take(self.config.max_failure_cases)
            .map(|row| FailureCase {
                row: Some(*row),
                value: values[*row].clone(),
            })
            .collect();
        SchemaViolation::new(&schema.name, &column.name, check, cases, rows.len())
    }
}

/// Dates have no native JSON form and serialize as `%Y-%m-%d` strings. Read
/// that form back into dates for date columns, whether or not the column
/// coerces. Returns `None` when nothing changes.
fn decode_serialized_dates(dtype: DataType, values: &[Value]) -> Option<Vec<Value>> {
    if dtype != DataType::Date {
        return None;
    }
    let mut changed = false;
    let decoded = values
        .iter()
        .map(|value| match value {
            Value::Str(s) => match NaiveDate::parse_from_str(s, DATE_FORMAT) {
                Ok(date) => {
                    changed = true;
                    Value::Date(date)
                }
                Err(_) => value.clone(),
            },
            other => other.clone(),
        })
        .collect();
    changed.then_some(decoded)
}

fn rows_where<F>(values: &[Value], predicate: F) -> Vec<usize>
where
    F: Fn(&Value) -> bool,
{
    values
        .iter()
        .enumerate()
        .filter(|(_, v)| predicate(v))
        .map(|(row, _)| row)
        .collect()
}

fn find_out_of_range(values: &[Value], min: Option<f64>, max: Option<f64>) -> Vec<usize> {
    rows_where(values, |value| {
        if value.is_null() {
            return false;
        }
        match value.as_f64() {
            Some(num) => {
                let below_min = min.map(|m| num < m).unwrap_or(false);
                let above_max = max.map(|m| num > m).unwrap_or(false);
                below_min || above_max
            }
            None => true,
        }
    })
}

fn find_unexpected_values(values: &[Value], expected: &[Value]) -> Vec<usize> {
    let allowed: Vec<String> = expected.iter().map(Value::key).collect();
    rows_where(values, |value| !value.is_null() && !allowed.contains(&value.key()))
}

/// Every row whose value occurs more than once.
fn find_duplicates(values: &[Value]) -> Vec<usize> {
    let mut value_rows: IndexMap<String, Vec<usize>> = IndexMap::new();

    for (row_idx, value) in values.iter().enumerate() {
        if value.is_null() {
            continue;
        }
        value_rows.entry(value.key()).or_default().push(row_idx);
    }

    let mut rows: Vec<usize> = value_rows
        .into_values()
        .filter(|rows| rows.len() > 1)
        .flatten()
        .collect();
    rows.sort_unstable();
    rows
}

fn find_pattern_mismatches(values: &[Value], regex: &Regex) -> Vec<usize> {
    rows_where(values, |value| match value {
        Value::Null => false,
        Value::Str(s) => !regex.is_match(s),
        other => !regex.is_match(&other.to_string()),
    })
}

fn find_length_violations(values: &[Value], min: Option<usize>, max: Option<usize>) -> Vec<usize> {
    rows_where(values, |value| match value.as_str() {
        Some(s) => {
            let len = s.chars().count();
            min.map(|m| len < m).unwrap_or(false) || max.map(|m| len > m).unwrap_or(false)
        }
        None => !value.is_null(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn users() -> SchemaDefinition {
        SchemaDefinition::builder("UserSchema")
            .column(ColumnSpec::new("user_id", DataType::Int).ge(1.0))
            .column(ColumnSpec::new("username", DataType::Str).unique())
            .build()
    }

    fn table(value: serde_json::Value) -> Table {
        Table::from_json(&value).unwrap()
    }

    #[test]
    fn test_valid_table_passes_unchanged() {
        let input = table(json!({"user_id": [1, 2, 3], "username": ["alice", "bob", "carol"]}));
        let validated = SchemaValidator::new().validate(&input, &users()).unwrap();
        assert_eq!(validated, input);
    }

    #[test]
    fn test_uniqueness_violation() {
        let input = table(json!({"user_id": [1, 2, 3], "username": ["alice", "bob", "bob"]}));
        let violation = SchemaValidator::new().validate(&input, &users()).unwrap_err();

        assert_eq!(violation.column, "username");
        assert!(violation.check.is_uniqueness());
        assert_eq!(violation.failure_cases.len(), 2);
        assert!(violation.message.contains("field_uniqueness"));
        assert!(violation.message.contains("UserSchema"));
    }

    #[test]
    fn test_minimum_violation() {
        let input = table(json!({"user_id": [1, 2, -1], "username": ["alice", "bob", "carol"]}));
        let violation = SchemaValidator::new().validate(&input, &users()).unwrap_err();

        assert_eq!(violation.column, "user_id");
        assert_eq!(violation.check.name(), "greater_than_or_equal_to(1)");
        assert_eq!(violation.failure_cases[0].row, Some(2));
        assert_eq!(violation.failure_cases[0].value, Value::Int(-1));
    }

    #[test]
    fn test_missing_column() {
        let input = table(json!({"user_id": [1]}));
        let violation = SchemaValidator::new().validate(&input, &users()).unwrap_err();
        assert_eq!(violation.check, CheckKind::ColumnInTable);
        assert_eq!(violation.column, "username");
    }

    #[test]
    fn test_dtype_mismatch_without_coercion() {
        let schema = SchemaDefinition::builder("Amounts")
            .column(ColumnSpec::new("amount", DataType::Float))
            .build();
        let violation = SchemaValidator::new()
            .validate(&table(json!({"amount": [1, 2]})), &schema)
            .unwrap_err();
        assert_eq!(violation.check, CheckKind::Dtype { dtype: DataType::Float });
    }

    #[test]
    fn test_coercion_rewrites_column() {
        let schema = SchemaDefinition::builder("Staff")
            .column(ColumnSpec::new("start_date", DataType::Date))
            .column(ColumnSpec::new("salary", DataType::Float).ge(0.0))
            .coerce(true)
            .build();
        let input = table(json!({"start_date": ["2020-01-15"], "salary": [75000]}));
        let validated = SchemaValidator::new().validate(&input, &schema).unwrap();

        assert_eq!(validated.get(0, "salary"), Some(&Value::Float(75000.0)));
        assert!(matches!(validated.get(0, "start_date"), Some(Value::Date(_))));
    }

    #[test]
    fn test_coercion_failure() {
        let schema = SchemaDefinition::builder("Staff")
            .column(ColumnSpec::new("start_date", DataType::Date).coerce())
            .build();
        let violation = SchemaValidator::new()
            .validate(&table(json!({"start_date": ["yesterday"]})), &schema)
            .unwrap_err();
        assert_eq!(violation.check, CheckKind::Coerce { dtype: DataType::Date });
    }

    #[test]
    fn test_nulls_rejected_unless_nullable() {
        let strict = SchemaDefinition::builder("Names")
            .column(ColumnSpec::new("name", DataType::Str))
            .build();
        let lenient = SchemaDefinition::builder("Names")
            .column(ColumnSpec::new("name", DataType::Str).nullable())
            .build();
        let input = table(json!({"name": ["a", null]}));

        let violation = SchemaValidator::new().validate(&input, &strict).unwrap_err();
        assert_eq!(violation.check, CheckKind::NotNullable);
        assert!(SchemaValidator::new().validate(&input, &lenient).is_ok());
    }

    #[test]
    fn test_isin_and_pattern() {
        let schema = SchemaDefinition::builder("Departments")
            .column(
                ColumnSpec::new("department", DataType::Str)
                    .isin(["Engineering", "Marketing", "HR", "Finance"]),
            )
            .column(ColumnSpec::new("code", DataType::Str).matches("[A-Z]{3}"))
            .build();

        let ok = table(json!({"department": ["HR"], "code": ["ENG"]}));
        assert!(SchemaValidator::new().validate(&ok, &schema).is_ok());

        let bad = table(json!({"department": ["Legal", "HR"], "code": ["ENGX", "abc"]}));
        let violations = SchemaValidator::new().validate_all(&bad, &schema).unwrap_err();
        assert_eq!(violations.len(), 2);
        assert_eq!(violations[0].failure_cases.len(), 1);
        assert_eq!(violations[1].failure_cases.len(), 2);
    }

    #[test]
    fn test_strict_rejects_extra_columns() {
        let schema = SchemaDefinition::builder("Only")
            .column(ColumnSpec::new("a", DataType::Int))
            .strict(true)
            .build();
        let violation = SchemaValidator::new()
            .validate(&table(json!({"a": [1], "b": [2]})), &schema)
            .unwrap_err();
        assert_eq!(violation.check, CheckKind::ColumnInSchema);
        assert_eq!(violation.column, "b");
    }

    #[test]
    fn test_failure_cases_capped() {
        let validator = SchemaValidator::with_config(ValidatorConfig {
            max_failure_cases: 2,
        });
        let schema = SchemaDefinition::builder("Positive")
            .column(ColumnSpec::new("n", DataType::Int).gt(0.0))
            .build();
        let violation = validator
            .validate(&table(json!({"n": [-1, -2, -3, 4]})), &schema)
            .unwrap_err();
        assert_eq!(violation.failure_cases.len(), 2);
        assert!(violation.message.contains("3 failure case(s)"));
    }

    #[test]
    fn test_serialized_dates_read_back_without_coercion() {
        let schema = SchemaDefinition::builder("Events")
            .column(ColumnSpec::new("day", DataType::Date))
            .build();
        let validated = SchemaValidator::new()
            .validate(&table(json!({"day": ["2020-01-15", null]})), &schema);
        let validated = validated.unwrap_err();
        assert_eq!(validated.check, CheckKind::NotNullable);

        let validated = SchemaValidator::new()
            .validate(&table(json!({"day": ["2020-01-15"]})), &schema)
            .unwrap();
        assert_eq!(
            validated.get(0, "day"),
            Some(&Value::Date(NaiveDate::from_ymd_opt(2020, 1, 15).unwrap()))
        );

        let violation = SchemaValidator::new()
            .validate(&table(json!({"day": ["15/01/2020"]})), &schema)
            .unwrap_err();
        assert_eq!(violation.check, CheckKind::Dtype { dtype: DataType::Date });
    }

    #[test]
    fn test_large_distinct_floats_are_unique() {
        let schema = SchemaDefinition::builder("Big")
            .column(ColumnSpec::new("x", DataType::Float).unique())
            .build();
        assert!(
            SchemaValidator::new()
                .validate(&table(json!({"x": [1e19, 2e19]})), &schema)
                .is_ok()
        );
        assert!(
            SchemaValidator::new()
                .validate(&table(json!({"x": [1e19, 1e19]})), &schema)
                .is_err()
        );
    }
}
