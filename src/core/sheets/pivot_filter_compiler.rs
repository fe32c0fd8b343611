use super::column_address;
use super::pivot_models::{
    BooleanCondition, ConditionValue, DestinationFilterSpec, FilterCriteria, PivotError,
    PivotFilter,
};

/// Compiles filters in order, one filter spec per filter.
///
/// A visible-value list wins over a condition. A filter with neither produces
/// empty criteria, which the service treats as "show everything".
pub fn compile(filters: &[PivotFilter]) -> Result<Vec<DestinationFilterSpec>, PivotError> {
    filters.iter().map(compile_one).collect()
}

fn compile_one(filter: &PivotFilter) -> Result<DestinationFilterSpec, PivotError> {
    let column_offset_index = column_address::resolve(&filter.source_column)?;

    let filter_criteria = if let Some(visible_values) = &filter.visible_values {
        FilterCriteria {
            visible_values: Some(visible_values.clone()),
            condition: None,
        }
    } else if let Some(condition) = &filter.condition {
        FilterCriteria {
            visible_values: None,
            condition: Some(BooleanCondition {
                condition_type: condition.condition_type.clone(),
                values: condition
                    .operands
                    .iter()
                    .map(|operand| ConditionValue {
                        user_entered_value: operand_text(operand),
                    })
                    .collect(),
            }),
        }
    } else {
        FilterCriteria::default()
    };

    Ok(DestinationFilterSpec {
        column_offset_index,
        filter_criteria,
    })
}

// Operands are always sent as strings.
fn operand_text(operand: &serde_json::Value) -> String {
    match operand {
        serde_json::Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
