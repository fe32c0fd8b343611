// Translates a bucketing strategy into the Sheets `PivotGroupRule` shape.

use super::pivot_models::{
    DestinationGroupRule, ExtendedValue, GroupRule, ManualGroup, ManualRuleGroup, PivotError,
};

pub fn compile(rule: &GroupRule) -> Result<DestinationGroupRule, PivotError> {
    match rule {
        GroupRule::DateTime(rule_type) => Ok(DestinationGroupRule::DateTimeRule {
            rule_type: *rule_type,
        }),
        GroupRule::Histogram {
            interval,
            start,
            end,
        } => Ok(DestinationGroupRule::HistogramRule {
            interval: *interval,
            start: *start,
            end: *end,
        }),
        GroupRule::Manual(groups) => {
            let groups = groups
                .iter()
                .map(compile_manual_group)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(DestinationGroupRule::ManualRule { groups })
        }
    }
}

fn compile_manual_group(group: &ManualGroup) -> Result<ManualRuleGroup, PivotError> {
    let items = group
        .member_values
        .iter()
        .map(|value| member_value(&group.name, value))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ManualRuleGroup {
        group_name: ExtendedValue::StringValue(group.name.clone()),
        items,
    })
}

/// Numbers stay numeric; every other JSON value is matched as text.
fn member_value(group_name: &str, value: &serde_json::Value) -> Result<ExtendedValue, PivotError> {
    match value {
        serde_json::Value::Number(number) => number
            .as_f64()
            .map(ExtendedValue::NumberValue)
            .ok_or_else(|| {
                PivotError::InvalidSpec(format!(
                    "manual group '{}' has an unrepresentable number {}",
                    group_name, number
                ))
            }),
        serde_json::Value::String(text) => Ok(ExtendedValue::StringValue(text.clone())),
        other => Ok(ExtendedValue::StringValue(other.to_string())),
    }
}
