//! Built-in schemas and the salary analytics over them.

use framebridge::{
    ColumnSpec, DataFrameModel, DataType, SchemaDefinition, SchemaRef, Validated, dataframe_model,
};
use serde_json::json;

const DEPARTMENTS: [&str; 4] = ["Engineering", "Marketing", "HR", "Finance"];

dataframe_model! {
    /// Employee records.
    pub struct Employee => SchemaDefinition::builder("Employee")
        .description("Schema for employee data")
        .coerce(true)
        .column(ColumnSpec::new("id", DataType::Int).ge(1.0))
        .column(ColumnSpec::new("name", DataType::Str).description("Employee full name"))
        .column(ColumnSpec::new("age", DataType::Int).in_range(18.0, 100.0))
        .column(ColumnSpec::new("salary", DataType::Float).ge(0.0))
        .column(ColumnSpec::new("department", DataType::Str).isin(DEPARTMENTS))
        .column(ColumnSpec::new("start_date", DataType::Date))
        .column(ColumnSpec::new("is_manager", DataType::Bool))
        .build();
}

dataframe_model! {
    /// Product catalogue entries.
    pub struct Product => SchemaDefinition::builder("Product")
        .description("Schema for product data")
        .coerce(true)
        .column(ColumnSpec::new("id", DataType::Int).ge(1.0))
        .column(ColumnSpec::new("name", DataType::Str))
        .column(ColumnSpec::new("price", DataType::Float).ge(0.0))
        .column(ColumnSpec::new("category", DataType::Str))
        .column(ColumnSpec::new("in_stock", DataType::Bool))
        .build();
}

dataframe_model! {
    /// Mean salary per department.
    pub struct DepartmentSalary => SchemaDefinition::builder("DepartmentSalary")
        .column(ColumnSpec::new("department", DataType::Str).isin(DEPARTMENTS))
        .column(ColumnSpec::new("avg_salary", DataType::Float))
        .build();
}

/// Every built-in schema.
pub fn schemas() -> Vec<SchemaRef> {
    vec![
        Employee::schema(),
        Product::schema(),
        DepartmentSalary::schema(),
    ]
}

/// Built-in schema by name, ignoring case.
pub fn find(name: &str) -> Option<SchemaRef> {
    schemas()
        .into_iter()
        .find(|s| s.name.eq_ignore_ascii_case(name))
}

/// Five sample employees.
pub fn employee_sample() -> serde_json::Value {
    json!({
        "id": [1, 2, 3, 4, 5],
        "name": ["Alice", "Bob", "Charlie", "Diana", "Evan"],
        "age": [28, 35, 42, 31, 25],
        "salary": [75000.0, 85000.0, 120000.0, 92000.0, 65000.0],
        "department": ["Engineering", "Marketing", "Finance", "Engineering", "HR"],
        "start_date": ["2020-01-15", "2018-05-20", "2015-11-10", "2019-08-05", "2021-03-22"],
        "is_manager": [false, true, true, false, false]
    })
}

/// Average salary by department, departments in alphabetical order.
pub fn salary_by_department(
    employees: &Validated<Employee>,
) -> framebridge::Result<Validated<DepartmentSalary>> {
    let sorted = employees.sort_by("department")?;
    let means = sorted.group_mean("department", "salary", "avg_salary")?;
    Validated::new(means)
}
