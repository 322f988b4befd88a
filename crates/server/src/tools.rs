// Built-in operations: summary statistics over a list of numbers

use anyhow::{bail, Result};
use serde_json::{json, Value};
use std::sync::Arc;
use tether_core::{
    ArgumentMap, Operation, OperationDescriptor, OperationRegistry, ParamSpec, ParamType,
    RegistryError,
};

/// Register the built-in operation set.
pub fn register_builtin(registry: &mut OperationRegistry) -> Result<(), RegistryError> {
    registry.register(Arc::new(SumTool))?;
    registry.register(Arc::new(AnalyzeDataTool))?;
    Ok(())
}

/// Pull the numeric entries out of a raw value list. Numeric strings count
/// as numbers; everything else is skipped.
fn extract_numbers(values: &[Value]) -> Vec<f64> {
    values
        .iter()
        .filter_map(|value| match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        })
        .collect()
}

fn numeric_values(arguments: &ArgumentMap) -> Result<Vec<f64>> {
    let Some(values) = arguments.get("values").and_then(Value::as_array) else {
        bail!("values must be an array");
    };
    let numbers = extract_numbers(values);
    if numbers.is_empty() {
        bail!("no valid numeric data in values");
    }
    Ok(numbers)
}

fn median(sorted: &[f64]) -> f64 {
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        sorted[mid]
    } else {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    }
}

/// Sum a list of numbers.
#[derive(Debug)]
pub struct SumTool;

#[async_trait::async_trait]
impl Operation for SumTool {
    fn descriptor(&self) -> OperationDescriptor {
        OperationDescriptor::new("sum", "Sum a list of numbers")
            .with_param(ParamSpec::required("values", ParamType::Array))
    }

    async fn call(&self, arguments: ArgumentMap) -> Result<Value> {
        let numbers = numeric_values(&arguments)?;
        Ok(json!(numbers.iter().sum::<f64>()))
    }
}

/// Summary statistics over a numeric list. Ignores non-numeric entries.
#[derive(Debug)]
pub struct AnalyzeDataTool;

#[async_trait::async_trait]
impl Operation for AnalyzeDataTool {
    fn descriptor(&self) -> OperationDescriptor {
        OperationDescriptor::new(
            "analyze-data",
            "Analyze a numeric list with summary stats. Ignores text.",
        )
        .with_param(ParamSpec::required("values", ParamType::Array))
    }

    async fn call(&self, arguments: ArgumentMap) -> Result<Value> {
        let mut numbers = numeric_values(&arguments)?;
        numbers.sort_by(|a, b| a.total_cmp(b));

        let sum: f64 = numbers.iter().sum();
        let mean = sum / numbers.len() as f64;

        Ok(json!({
            "sum": sum,
            "mean": mean,
            "average": mean,
            "median": median(&numbers),
            "min": numbers[0],
            "max": numbers[numbers.len() - 1],
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(value: Value) -> ArgumentMap {
        value.as_object().unwrap().clone()
    }

    #[tokio::test]
    async fn test_sum_of_integers() {
        let result = SumTool
            .call(args(json!({"values": [1, 2, 3, 4, 5]})))
            .await
            .unwrap();
        assert_eq!(result, json!(15.0));
    }

    #[tokio::test]
    async fn test_numeric_strings_are_coerced() {
        let result = SumTool
            .call(args(json!({"values": ["1", 2, "3.5"]})))
            .await
            .unwrap();
        assert_eq!(result, json!(6.5));
    }

    #[tokio::test]
    async fn test_non_numeric_entries_are_skipped() {
        let result = SumTool
            .call(args(json!({"values": [1, "text", true, null, 2]})))
            .await
            .unwrap();
        assert_eq!(result, json!(3.0));
    }

    #[tokio::test]
    async fn test_all_non_numeric_is_an_error() {
        let err = SumTool
            .call(args(json!({"values": ["a", "b"]})))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "no valid numeric data in values");
    }

    #[tokio::test]
    async fn test_analyze_data_summary() {
        let result = AnalyzeDataTool
            .call(args(json!({"values": [4, 1, 3, 2]})))
            .await
            .unwrap();
        assert_eq!(result["sum"], json!(10.0));
        assert_eq!(result["mean"], json!(2.5));
        assert_eq!(result["average"], json!(2.5));
        assert_eq!(result["median"], json!(2.5));
        assert_eq!(result["min"], json!(1.0));
        assert_eq!(result["max"], json!(4.0));
    }

    #[tokio::test]
    async fn test_median_of_odd_count() {
        let result = AnalyzeDataTool
            .call(args(json!({"values": [9, 1, 5]})))
            .await
            .unwrap();
        assert_eq!(result["median"], json!(5.0));
    }

    #[test]
    fn test_register_builtin_is_conflict_free() {
        let mut registry = OperationRegistry::new();
        register_builtin(&mut registry).unwrap();

        let names: Vec<String> = registry
            .describe_all()
            .into_iter()
            .map(|d| d.name)
            .collect();
        assert_eq!(names, vec!["sum", "analyze-data"]);
    }
}
