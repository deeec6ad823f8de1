use std::{cmp::Ordering, fmt};

use serde_json::Value;

use crate::Time;

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Table {
    Comments,
    Submissions,
}

impl Table {
    pub fn name(&self) -> &'static str {
        match self {
            Table::Comments => "aiet_comments",
            Table::Submissions => "aiet_submissions",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Row filter, restricted to what the hosted backend's query API offers
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Query {
    All(Vec<Query>),
    Eq { column: String, value: String },
    IsNull(String),
}

impl Query {
    pub fn eq(column: &str, value: impl ToString) -> Query {
        Query::Eq {
            column: String::from(column),
            value: value.to_string(),
        }
    }

    pub fn is_null(column: &str) -> Query {
        Query::IsNull(String::from(column))
    }

    /// Filter as PostgREST query parameters, all of which must hold
    pub fn to_postgrest(&self) -> Vec<(String, String)> {
        let mut res = Vec::new();
        self.add_to_postgrest(&mut res);
        res
    }

    fn add_to_postgrest(&self, res: &mut Vec<(String, String)>) {
        match self {
            // PostgREST already ANDs together all the filters it is given
            Query::All(queries) => {
                for q in queries {
                    q.add_to_postgrest(&mut *res);
                }
            }
            Query::Eq { column, value } => res.push((column.clone(), format!("eq.{value}"))),
            Query::IsNull(column) => res.push((column.clone(), String::from("is.null"))),
        }
    }

    /// Evaluate this filter against one JSON row, the way the backend would
    pub fn matches(&self, row: &Value) -> bool {
        match self {
            Query::All(queries) => queries.iter().all(|q| q.matches(row)),
            Query::Eq { column, value } => match row.get(column) {
                None | Some(Value::Null) => false,
                Some(Value::String(s)) => s == value,
                Some(other) => other.to_string() == *value,
            },
            Query::IsNull(column) => matches!(row.get(column), None | Some(Value::Null)),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum OrderType {
    Asc,
    Desc,
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Order {
    CreationDate(OrderType),
}

impl Order {
    pub fn column(&self) -> &'static str {
        match self {
            Order::CreationDate(_) => "created_at",
        }
    }

    pub fn to_postgrest(&self) -> String {
        match self {
            Order::CreationDate(OrderType::Asc) => String::from("created_at.asc"),
            Order::CreationDate(OrderType::Desc) => String::from("created_at.desc"),
        }
    }

    /// Sort JSON rows, keeping insertion order among equal timestamps
    pub fn sort(&self, rows: &mut [Value]) {
        let date = |row: &Value| -> Option<Time> {
            row.get(self.column())
                .and_then(|d| d.as_str())
                .and_then(|d| d.parse::<Time>().ok())
        };
        rows.sort_by(|a, b| {
            let ord = date(a).cmp(&date(b));
            match self {
                Order::CreationDate(OrderType::Asc) => ord,
                Order::CreationDate(OrderType::Desc) => ord.reverse(),
            }
        });
    }

    pub fn compare(&self, a: &Time, b: &Time) -> Ordering {
        match self {
            Order::CreationDate(OrderType::Asc) => a.cmp(b),
            Order::CreationDate(OrderType::Desc) => b.cmp(a),
        }
    }
}
