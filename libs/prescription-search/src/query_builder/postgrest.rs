//! Rendering of a [`SearchPlan`] as PostgREST query parameters

use super::escape::{contains_pattern, quote_list_value};
use super::{Predicate, SearchPlan, SortSpec};

/// Embedded select: prescription columns plus the medications relation.
pub const SELECT_WITH_MEDICATIONS: &str = "*,medications(*)";

/// Filter parameters for the plan's predicates, in predicate order.
pub fn filter_pairs(plan: &SearchPlan) -> Vec<(String, String)> {
    plan.predicates.iter().map(predicate_pair).collect()
}

fn predicate_pair(predicate: &Predicate) -> (String, String) {
    match predicate {
        Predicate::Text(text) => {
            let pattern = quote_list_value(&contains_pattern(text));
            (
                "or".to_string(),
                format!(
                    "(id.ilike.{pattern},patient_name.ilike.{pattern},doctor_name.ilike.{pattern})"
                ),
            )
        }
        Predicate::PatientName(name) => (
            "patient_name".to_string(),
            format!("ilike.{}", contains_pattern(name)),
        ),
        Predicate::DoctorName(name) => (
            "doctor_name".to_string(),
            format!("ilike.{}", contains_pattern(name)),
        ),
        Predicate::StatusIn(statuses) => {
            let values: Vec<&str> = statuses.iter().map(|s| s.as_str()).collect();
            ("status".to_string(), format!("in.({})", values.join(",")))
        }
        Predicate::DateFrom(from) => ("date".to_string(), format!("gte.{from}")),
        Predicate::DateTo(to) => ("date".to_string(), format!("lte.{to}")),
    }
}

pub fn order_value(sort: &SortSpec) -> String {
    let direction = if sort.ascending { "asc" } else { "desc" };
    format!("{}.{}", sort.field.column(), direction)
}

/// Complete query string pairs for a paginated search.
pub fn search_query_pairs(plan: &SearchPlan) -> Vec<(String, String)> {
    let mut pairs = vec![("select".to_string(), SELECT_WITH_MEDICATIONS.to_string())];
    pairs.extend(filter_pairs(plan));
    pairs.push(("order".to_string(), order_value(&plan.sort)));
    pairs.push(("offset".to_string(), plan.window.offset().to_string()));
    pairs.push(("limit".to_string(), plan.window.page_size.to_string()));
    pairs
}

/// Query pairs for a single-column "contains" lookup used by suggestions.
pub fn lookup_pairs(column: &str, text: &str, limit: usize) -> Vec<(String, String)> {
    vec![
        ("select".to_string(), column.to_string()),
        (column.to_string(), format!("ilike.{}", contains_pattern(text))),
        ("limit".to_string(), limit.to_string()),
    ]
}
