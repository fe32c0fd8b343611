// Domain models for the pivot-table compiler.
//
// Two families of types live here:
// - the *input* side (`PivotTableSpec` and friends), deserialized straight from
//   tool arguments, so field names are snake_case;
// - the *output* side (`PivotTableDescriptor` and friends), serialized in the
//   camelCase shape the Sheets API expects inside an `updateCells` request.
//
// Nothing in this file talks to the network.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// ============================================================================
// ERRORS
// ============================================================================

/// Everything that can go wrong while compiling or applying a pivot table.
///
/// Every variant carries the offending range string, column reference or sheet
/// name so the tool layer can turn it straight into a user-facing message.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PivotError {
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("Invalid pivot table specification: {0}")]
    InvalidSpec(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// The spreadsheet service (or its transport) failed.
    #[error("Spreadsheet service error: {0}")]
    Service(String),
}

// ============================================================================
// INPUT MODELS
// ============================================================================

/// A column reference as the agent supplies it: `0`, `4`, `"A"`, `"aa"`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ColumnRef {
    Index(u32),
    Letters(String),
}

impl From<u32> for ColumnRef {
    fn from(index: u32) -> Self {
        ColumnRef::Index(index)
    }
}

impl From<&str> for ColumnRef {
    fn from(letters: &str) -> Self {
        ColumnRef::Letters(letters.to_string())
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnRef::Index(index) => write!(f, "{}", index),
            ColumnRef::Letters(letters) => write!(f, "{}", letters),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SortOrder {
    #[serde(alias = "ASC")]
    Ascending,
    #[serde(alias = "DESC")]
    Descending,
}

/// Date/time truncation granularities. The vocabulary is shared with the
/// Sheets API, so values are passed through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DateTimeRuleType {
    Second,
    Minute,
    Hour,
    HourMinute,
    HourMinuteAmpm,
    DayOfWeek,
    DayOfYear,
    DayOfMonth,
    DayMonth,
    Month,
    Quarter,
    Year,
    YearMonth,
    YearQuarter,
    YearMonthDay,
}

/// One named bucket of a manual grouping rule.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ManualGroup {
    pub name: String,
    /// Raw member values; numbers stay numbers, anything else becomes text.
    #[serde(default)]
    pub member_values: Vec<serde_json::Value>,
}

/// How a row/column grouping buckets its values.
///
/// Exactly one strategy is populated. The wire shape is an object with three
/// optional keys, so deserialization goes through `GroupRuleFields` and
/// rejects zero or several populated keys.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "GroupRuleFields")]
pub enum GroupRule {
    DateTime(DateTimeRuleType),
    Histogram {
        interval: f64,
        start: Option<f64>,
        end: Option<f64>,
    },
    Manual(Vec<ManualGroup>),
}

#[derive(Debug, Deserialize)]
struct DateTimeRuleFields {
    #[serde(rename = "type")]
    rule_type: DateTimeRuleType,
}

#[derive(Debug, Deserialize)]
struct HistogramRuleFields {
    interval: f64,
    start: Option<f64>,
    end: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ManualRuleFields {
    groups: Vec<ManualGroup>,
}

/// Wire shape of a group rule before the exactly-one check.
#[derive(Debug, Default, Deserialize)]
pub struct GroupRuleFields {
    date_time_rule: Option<DateTimeRuleFields>,
    histogram_rule: Option<HistogramRuleFields>,
    manual_rule: Option<ManualRuleFields>,
}

impl TryFrom<GroupRuleFields> for GroupRule {
    type Error = PivotError;

    fn try_from(fields: GroupRuleFields) -> Result<Self, Self::Error> {
        match (fields.date_time_rule, fields.histogram_rule, fields.manual_rule) {
            (Some(date_time), None, None) => Ok(GroupRule::DateTime(date_time.rule_type)),
            (None, Some(histogram), None) => {
                if !(histogram.interval > 0.0) {
                    return Err(PivotError::InvalidSpec(format!(
                        "histogram_rule interval must be greater than 0, got {}",
                        histogram.interval
                    )));
                }
                Ok(GroupRule::Histogram {
                    interval: histogram.interval,
                    start: histogram.start,
                    end: histogram.end,
                })
            }
            (None, None, Some(manual)) => Ok(GroupRule::Manual(manual.groups)),
            (None, None, None) => Err(PivotError::InvalidSpec(
                "group_rule must set one of date_time_rule, histogram_rule or manual_rule"
                    .to_string(),
            )),
            _ => Err(PivotError::InvalidSpec(
                "group_rule must set only one of date_time_rule, histogram_rule or manual_rule"
                    .to_string(),
            )),
        }
    }
}

fn default_show_totals() -> bool {
    true
}

/// One row or column grouping of the pivot table.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PivotGroup {
    pub source_column: ColumnRef,
    pub label: Option<String>,
    #[serde(default = "default_show_totals")]
    pub show_totals: bool,
    pub sort_order: Option<SortOrder>,
    /// Sort the groups by the values column at this index.
    pub sort_by_value_index: Option<u32>,
    pub group_rule: Option<GroupRule>,
    /// Only show the first N groups.
    pub group_limit: Option<u32>,
}

impl PivotGroup {
    pub fn new(source_column: impl Into<ColumnRef>) -> Self {
        Self {
            source_column: source_column.into(),
            label: None,
            show_totals: true,
            sort_order: None,
            sort_by_value_index: None,
            group_rule: None,
            group_limit: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SummarizeFunction {
    Sum,
    Counta,
    Count,
    Countunique,
    Average,
    Max,
    Min,
    Median,
    Product,
    Stdev,
    Stdevp,
    Var,
    Varp,
    /// Required by the Sheets API for formula-backed values.
    Custom,
}

/// Shows a value as a percentage of a total instead of the raw aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PercentDisplay {
    PercentOfRowTotal,
    PercentOfColumnTotal,
    PercentOfGrandTotal,
}

/// One aggregated value. Exactly one of `source_column` / `formula` is set.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PivotValue {
    pub source_column: Option<ColumnRef>,
    pub formula: Option<String>,
    pub summarize_function: SummarizeFunction,
    pub name: Option<String>,
    pub percent_display: Option<PercentDisplay>,
}

impl PivotValue {
    pub fn column(source_column: impl Into<ColumnRef>, summarize_function: SummarizeFunction) -> Self {
        Self {
            source_column: Some(source_column.into()),
            formula: None,
            summarize_function,
            name: None,
            percent_display: None,
        }
    }

    pub fn formula(formula: impl Into<String>) -> Self {
        Self {
            source_column: None,
            formula: Some(formula.into()),
            summarize_function: SummarizeFunction::Custom,
            name: None,
            percent_display: None,
        }
    }
}

/// A condition such as `NUMBER_GREATER` with its operands.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FilterCondition {
    #[serde(rename = "type")]
    pub condition_type: String,
    #[serde(default, alias = "values")]
    pub operands: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PivotFilter {
    pub source_column: ColumnRef,
    pub visible_values: Option<Vec<String>>,
    pub condition: Option<FilterCondition>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValueLayout {
    #[default]
    Horizontal,
    Vertical,
}

/// The full declarative pivot table request.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PivotTableSpec {
    /// A1 range of the source data, e.g. `Sales!A1:E100` or `A:E`.
    pub source_range: String,
    pub destination_sheet_id: Option<i64>,
    pub destination_sheet_name: Option<String>,
    #[serde(default)]
    pub rows: Vec<PivotGroup>,
    #[serde(default)]
    pub columns: Vec<PivotGroup>,
    pub values: Vec<PivotValue>,
    #[serde(default)]
    pub filters: Vec<PivotFilter>,
    #[serde(default)]
    pub value_layout: ValueLayout,
}

impl PivotTableSpec {
    /// Checks the shape rules that hold across fields.
    pub fn validate(&self) -> Result<(), PivotError> {
        if self.rows.is_empty() && self.columns.is_empty() {
            return Err(PivotError::InvalidSpec(
                "at least one row or column grouping is required".to_string(),
            ));
        }
        if self.values.is_empty() {
            return Err(PivotError::InvalidSpec(
                "at least one value is required".to_string(),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// OUTPUT MODELS (Sheets API shape)
// ============================================================================

/// The source data rectangle. Serializes as a Sheets `GridRange`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SourceRegion {
    #[serde(rename = "sheetId")]
    pub sheet_id: i64,
    #[serde(rename = "startRowIndex")]
    pub start_row: u32,
    #[serde(rename = "startColumnIndex")]
    pub start_col: u32,
    #[serde(rename = "endRowIndex")]
    pub end_row: u32,
    #[serde(rename = "endColumnIndex")]
    pub end_col: u32,
}

/// A typed cell value, `{"numberValue": 3}` or `{"stringValue": "x"}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ExtendedValue {
    NumberValue(f64),
    StringValue(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualRuleGroup {
    pub group_name: ExtendedValue,
    pub items: Vec<ExtendedValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DestinationGroupRule {
    DateTimeRule {
        #[serde(rename = "type")]
        rule_type: DateTimeRuleType,
    },
    HistogramRule {
        interval: f64,
        #[serde(skip_serializing_if = "Option::is_none")]
        start: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        end: Option<f64>,
    },
    ManualRule {
        groups: Vec<ManualRuleGroup>,
    },
}

/// An empty bucket (`{}`) asks for alphabetical ordering in `sortOrder`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueBucket {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub values_index: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupLimit {
    pub count_limit: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DestinationGroup {
    pub source_column_offset: u32,
    pub show_totals: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<SortOrder>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_bucket: Option<ValueBucket>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_rule: Option<DestinationGroupRule>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_limit: Option<GroupLimit>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DestinationValue {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_column_offset: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formula: Option<String>,
    pub summarize_function: SummarizeFunction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calculated_display_type: Option<PercentDisplay>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionValue {
    pub user_entered_value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BooleanCondition {
    #[serde(rename = "type")]
    pub condition_type: String,
    pub values: Vec<ConditionValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCriteria {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visible_values: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<BooleanCondition>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DestinationFilterSpec {
    pub column_offset_index: u32,
    pub filter_criteria: FilterCriteria,
}

/// The compiled pivot table.
///
/// Serializing it yields the Sheets `PivotTable` object; the destination
/// fields are placement metadata for the writer and are not serialized.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PivotTableDescriptor {
    #[serde(rename = "source")]
    pub source_region: SourceRegion,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rows: Vec<DestinationGroup>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub columns: Vec<DestinationGroup>,
    pub values: Vec<DestinationValue>,
    #[serde(rename = "filterSpecs", skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<DestinationFilterSpec>,
    pub value_layout: ValueLayout,
    #[serde(skip)]
    pub destination_sheet_id: i64,
    /// Known only when the sheet was created for this pivot table.
    #[serde(skip)]
    pub destination_sheet_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn column_ref_accepts_numbers_and_letters() {
        let refs: Vec<ColumnRef> = serde_json::from_value(json!([3, "AB"])).unwrap();
        assert_eq!(refs, vec![ColumnRef::Index(3), ColumnRef::Letters("AB".into())]);
    }

    #[test]
    fn group_rule_requires_exactly_one_strategy() {
        let none = GroupRule::try_from(GroupRuleFields::default());
        assert!(matches!(none, Err(PivotError::InvalidSpec(_))));

        let both: Result<GroupRule, _> = serde_json::from_value(json!({
            "date_time_rule": {"type": "YEAR"},
            "histogram_rule": {"interval": 10}
        }));
        assert!(both.is_err());

        let histogram: GroupRule =
            serde_json::from_value(json!({"histogram_rule": {"interval": 10, "start": 0}}))
                .unwrap();
        assert_eq!(
            histogram,
            GroupRule::Histogram {
                interval: 10.0,
                start: Some(0.0),
                end: None
            }
        );
    }

    #[test]
    fn histogram_interval_must_be_positive() {
        let result: Result<GroupRule, _> =
            serde_json::from_value(json!({"histogram_rule": {"interval": 0}}));
        let err = result.unwrap_err();
        assert!(err.to_string().contains("greater than 0"));
    }

    #[test]
    fn pivot_group_defaults() {
        let group: PivotGroup = serde_json::from_value(json!({"source_column": "B"})).unwrap();
        assert_eq!(group, PivotGroup::new("B"));
        assert!(group.show_totals);
    }

    #[test]
    fn sort_order_accepts_short_aliases() {
        let orders: Vec<SortOrder> = serde_json::from_value(json!(["ASC", "DESCENDING"])).unwrap();
        assert_eq!(orders, vec![SortOrder::Ascending, SortOrder::Descending]);
    }

    #[test]
    fn spec_validation() {
        let mut spec: PivotTableSpec = serde_json::from_value(json!({
            "source_range": "A:E",
            "values": [{"source_column": "E", "summarize_function": "SUM"}]
        }))
        .unwrap();
        assert!(matches!(spec.validate(), Err(PivotError::InvalidSpec(_))));

        spec.rows.push(PivotGroup::new(0u32));
        assert!(spec.validate().is_ok());

        spec.values.clear();
        assert!(matches!(spec.validate(), Err(PivotError::InvalidSpec(_))));
    }

    #[test]
    fn descriptor_serializes_to_api_shape() {
        let descriptor = PivotTableDescriptor {
            source_region: SourceRegion {
                sheet_id: 3,
                start_row: 0,
                start_col: 0,
                end_row: 100,
                end_col: 5,
            },
            rows: vec![],
            columns: vec![],
            values: vec![],
            filters: vec![],
            value_layout: ValueLayout::Vertical,
            destination_sheet_id: 9,
            destination_sheet_name: None,
        };

        let value = serde_json::to_value(&descriptor).unwrap();
        assert_eq!(
            value,
            json!({
                "source": {
                    "sheetId": 3,
                    "startRowIndex": 0,
                    "startColumnIndex": 0,
                    "endRowIndex": 100,
                    "endColumnIndex": 5
                },
                "values": [],
                "valueLayout": "VERTICAL"
            })
        );
    }
}
