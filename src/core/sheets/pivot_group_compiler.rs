use super::column_address;
use super::group_rule_compiler;
use super::pivot_models::{DestinationGroup, GroupLimit, PivotError, PivotGroup, ValueBucket};

/// Compiles one row or column grouping.
///
/// Sorting: a `sort_by_value_index` produces a value bucket pointing at that
/// value column. A `sort_order` on its own still needs an empty value bucket,
/// otherwise the service falls back to its natural ordering instead of
/// sorting the group labels.
pub fn compile(group: &PivotGroup) -> Result<DestinationGroup, PivotError> {
    let source_column_offset = column_address::resolve(&group.source_column)?;

    let value_bucket = match (group.sort_by_value_index, group.sort_order) {
        (Some(index), _) => Some(ValueBucket {
            values_index: Some(index),
        }),
        (None, Some(_)) => Some(ValueBucket::default()),
        (None, None) => None,
    };

    let group_rule = group
        .group_rule
        .as_ref()
        .map(group_rule_compiler::compile)
        .transpose()?;

    Ok(DestinationGroup {
        source_column_offset,
        show_totals: group.show_totals,
        label: group.label.clone(),
        sort_order: group.sort_order,
        value_bucket,
        group_rule,
        group_limit: group.group_limit.map(|count_limit| GroupLimit { count_limit }),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::sheets::pivot_models::{DateTimeRuleType, GroupRule, SortOrder};
    use serde_json::json;

    #[test]
    fn resolves_column_and_copies_label() {
        let mut group = PivotGroup::new("C");
        group.label = Some("Region".to_string());
        group.show_totals = false;

        let compiled = compile(&group).unwrap();
        assert_eq!(compiled.source_column_offset, 2);
        assert_eq!(compiled.label.as_deref(), Some("Region"));
        assert!(!compiled.show_totals);
        assert!(compiled.value_bucket.is_none());
        assert!(compiled.sort_order.is_none());
    }

    #[test]
    fn sort_by_value_index_without_order() {
        let mut group = PivotGroup::new(0u32);
        group.sort_by_value_index = Some(0);

        let compiled = compile(&group).unwrap();
        assert_eq!(
            compiled.value_bucket,
            Some(ValueBucket {
                values_index: Some(0)
            })
        );
        assert!(compiled.sort_order.is_none());
    }

    #[test]
    fn sort_by_value_index_with_order() {
        let mut group = PivotGroup::new(0u32);
        group.sort_by_value_index = Some(1);
        group.sort_order = Some(SortOrder::Ascending);

        let compiled = compile(&group).unwrap();
        assert_eq!(compiled.value_bucket.unwrap().values_index, Some(1));
        assert_eq!(compiled.sort_order, Some(SortOrder::Ascending));
    }

    #[test]
    fn sort_order_alone_emits_empty_value_bucket() {
        let mut group = PivotGroup::new("A");
        group.sort_order = Some(SortOrder::Descending);

        let compiled = compile(&group).unwrap();
        let value = serde_json::to_value(&compiled).unwrap();
        assert_eq!(value["valueBucket"], json!({}));
        assert_eq!(value["sortOrder"], json!("DESCENDING"));
    }

    #[test]
    fn group_rule_and_limit_are_compiled() {
        let mut group = PivotGroup::new("B");
        group.group_rule = Some(GroupRule::DateTime(DateTimeRuleType::Quarter));
        group.group_limit = Some(10);

        let value = serde_json::to_value(compile(&group).unwrap()).unwrap();
        assert_eq!(
            value,
            json!({
                "sourceColumnOffset": 1,
                "showTotals": true,
                "groupRule": {"dateTimeRule": {"type": "QUARTER"}},
                "groupLimit": {"countLimit": 10}
            })
        );
    }

    #[test]
    fn bad_column_letters_fail() {
        let group = PivotGroup::new("B2");
        assert!(matches!(compile(&group), Err(PivotError::InvalidFormat(_))));
    }
}
