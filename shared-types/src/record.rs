use chrono::NaiveDate;

/// A loaded delimited file: the header row plus one typed record per data row.
///
/// The headers are kept so a table can be written back out with its
/// original column order.
#[derive(Debug, Clone, PartialEq)]
pub struct Table<R> {
    pub headers: Vec<String>,
    pub records: Vec<R>,
}

impl<R> Table<R> {
    pub fn new(headers: Vec<String>, records: Vec<R>) -> Self {
        Self { headers, records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }
}

/// One call joined with its order context (`merged_data.csv`).
#[derive(Debug, Clone, PartialEq)]
pub struct MergedRecord {
    pub start_timestamp: String,
    pub call_date: Option<NaiveDate>,
    pub user_sentiment: Option<String>,
    pub disconnection_reason: Option<String>,
    /// `None` when the cell is empty or not numeric
    pub duration_seconds: Option<f64>,
    pub call_successful: Option<String>,
    /// Present only when a purchase followed the call
    pub order_number: Option<String>,
    /// Every raw cell of the source row, in header order
    pub cells: Vec<String>,
}

impl MergedRecord {
    pub fn has_order(&self) -> bool {
        self.order_number.is_some()
    }
}

/// One call attempt (`call_data.csv`).
#[derive(Debug, Clone, PartialEq)]
pub struct CallRecord {
    pub start_timestamp: String,
    pub call_date: Option<NaiveDate>,
    /// Coerced: missing or non-numeric values are 0
    pub total_duration_secs: f64,
    /// Lowercased contact email
    pub email: Option<String>,
}

/// One purchase (`shopify_orders.csv`).
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRecord {
    /// Lowercased contact email
    pub contact_email: Option<String>,
}
