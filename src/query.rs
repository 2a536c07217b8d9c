//! Task-list query planning.
//!
//! Turns untrusted request parameters into an immutable plan consumed by the
//! list handler. Each parameter is independent and defaults to "no
//! constraint" when absent or malformed; the planner never executes anything.

use serde::Deserialize;

/// Raw, untrusted query parameters for `GET /tasks`.
///
/// All fields arrive as text so that a malformed value can fall back to "no
/// constraint" instead of failing deserialization of the whole query string.
#[derive(Debug, Deserialize, Default)]
pub struct TaskListParams {
    pub completed: Option<String>,
    #[serde(rename = "sortBy")]
    pub sort_by: Option<String>,
    pub limit: Option<String>,
    pub skip: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// A requested sort order. The field name is carried through uninterpreted;
/// the persistence layer maps known names to columns and ignores the rest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub field: String,
    pub direction: SortDirection,
}

/// The validated combination of filter, sort, and pagination bounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskListPlan {
    /// Boolean equality filter on the completed flag, if requested.
    pub completed: Option<bool>,
    pub sort: Option<SortSpec>,
    /// Maximum number of records, `None` = unbounded.
    pub limit: Option<i64>,
    /// Number of records to skip. Zero when absent or malformed.
    pub skip: i64,
}

impl TaskListPlan {
    /// Builds a plan from raw parameters.
    ///
    /// - `completed`: literal `"true"`/`"false"` only; anything else applies
    ///   no filter.
    /// - `sortBy`: `field:direction`, where only the literal `"desc"` flips
    ///   to descending.
    /// - `limit`/`skip`: non-negative integers; unparsable or negative values
    ///   are treated as absent rather than as errors.
    pub fn from_params(params: &TaskListParams) -> Self {
        let completed = match params.completed.as_deref() {
            Some("true") => Some(true),
            Some("false") => Some(false),
            _ => None,
        };

        let sort = params.sort_by.as_deref().and_then(|raw| {
            let (field, direction) = match raw.split_once(':') {
                Some((field, dir)) => {
                    let direction = if dir == "desc" {
                        SortDirection::Descending
                    } else {
                        SortDirection::Ascending
                    };
                    (field, direction)
                }
                None => (raw, SortDirection::Ascending),
            };
            if field.is_empty() {
                None
            } else {
                Some(SortSpec {
                    field: field.to_string(),
                    direction,
                })
            }
        });

        let limit = params
            .limit
            .as_deref()
            .and_then(|v| v.parse::<i64>().ok())
            .filter(|v| *v >= 0);

        let skip = params
            .skip
            .as_deref()
            .and_then(|v| v.parse::<i64>().ok())
            .filter(|v| *v >= 0)
            .unwrap_or(0);

        Self {
            completed,
            sort,
            limit,
            skip,
        }
    }
}
