use super::column_address;
use super::pivot_models::{DestinationValue, PivotError, PivotValue};

/// Compiles one aggregated value.
///
/// A value reads either a source column or a custom formula, never both.
/// Formulas are opaque and passed through as written.
pub fn compile(value: &PivotValue) -> Result<DestinationValue, PivotError> {
    let (source_column_offset, formula) = match (&value.source_column, &value.formula) {
        (Some(column), None) => (Some(column_address::resolve(column)?), None),
        (None, Some(formula)) => (None, Some(formula.clone())),
        (Some(column), Some(_)) => {
            return Err(PivotError::InvalidSpec(format!(
                "value on column {} must not also set a formula",
                column
            )))
        }
        (None, None) => {
            return Err(PivotError::InvalidSpec(
                "value needs either a source_column or a formula".to_string(),
            ))
        }
    };

    Ok(DestinationValue {
        source_column_offset,
        formula,
        summarize_function: value.summarize_function,
        name: value.name.clone(),
        calculated_display_type: value.percent_display,
    })
}
