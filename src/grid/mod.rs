//! Generic data-grid model.
//!
//! Columns come from a declared schema — a tagged renderer registry mapping
//! each field to a render strategy — rather than from whatever keys the first
//! record happens to carry. `TableSchema::infer` keeps the generic path for
//! unknown record shapes (and yields the empty state instead of panicking on
//! an empty set). The model layers a single global text filter, per-column
//! visibility, kind-aware sorting, and page-forward/back pagination on top of
//! a heterogeneous row set.

pub mod render;

use std::collections::HashSet;

use serde_json::Value;

use crate::models::{ApprovalStatus, Procedure};

pub use render::{CellView, INVALID_DATE, PLACEHOLDER};

/// Internal key the grid never shows.
pub const RESERVED_KEY: &str = "id_";

pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Shown when the grid has nothing to display.
pub const MSG_NO_ROWS: &str = "לא נמצאו פרוצדורות";

/// Hebrew column headers, keyed by field name.
const HEADER_LABELS: &[(&str, &str)] = &[
    ("id", "מזהה"),
    ("patient_id", "תעודת זהות מטופל"),
    ("procedure_code", "קוד פרוצדורה"),
    ("procedure_name", "שם פרוצדורה"),
    ("doctor_name", "שם רופא"),
    ("execution_date", "תאריך ביצוע"),
    ("notes", "הערות"),
    ("xray_url", "צילום רנטגן"),
    ("created_at", "נוצר בתאריך"),
    ("evaluation_result", "תוצאה"),
    ("approval_status", "סטטוס אישור"),
    ("risk_level", "רמת סיכון"),
    ("confidence", "רמת ודאות"),
    ("findings", "ממצאים"),
    ("recommendations", "המלצות"),
    ("medical_justification", "הצדקה רפואית"),
    ("contraindications", "ללא התוויות נגד"),
];

/// Header label for a field, falling back to the raw key.
pub fn header_label(key: &str) -> &str {
    HEADER_LABELS
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, label)| *label)
        .unwrap_or(key)
}

/// Render strategy for a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    /// Date + time split across two lines; sortable descending-first.
    DateTime,
    /// Raw approval label with the fixed three-level ordinal.
    Status,
    /// Expandable AI-analysis sub-table; sorts by the status ordinal.
    Analysis,
    /// Show/hide free text per row.
    Notes,
    /// Download trigger.
    FileRef,
    /// כן / לא
    Flag,
}

impl FieldKind {
    /// Kind assigned to a key when inferring a schema from raw records.
    fn for_key(key: &str) -> FieldKind {
        match key {
            "created_at" | "execution_date" => FieldKind::DateTime,
            "approval_status" => FieldKind::Status,
            "evaluation_result" => FieldKind::Analysis,
            "notes" => FieldKind::Notes,
            "xray_url" => FieldKind::FileRef,
            _ => FieldKind::Text,
        }
    }

    /// Dates toggle into descending first; everything else ascending first.
    fn descending_first(&self) -> bool {
        matches!(self, FieldKind::DateTime)
    }
}

/// One declared column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    pub key: String,
    pub label: String,
    pub kind: FieldKind,
    pub sortable: bool,
}

impl ColumnSpec {
    pub fn new(key: &str, label: &str, kind: FieldKind, sortable: bool) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            kind,
            sortable,
        }
    }
}

/// The declared renderer registry for a grid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableSchema {
    pub columns: Vec<ColumnSpec>,
}

impl TableSchema {
    /// The procedure grid as shown on the audit review screen.
    pub fn procedures() -> Self {
        let col = |key, kind, sortable| ColumnSpec::new(key, header_label(key), kind, sortable);
        Self {
            columns: vec![
                col("patient_id", FieldKind::Text, false),
                col("procedure_code", FieldKind::Text, false),
                col("procedure_name", FieldKind::Text, false),
                col("doctor_name", FieldKind::Text, false),
                col("execution_date", FieldKind::DateTime, true),
                col("created_at", FieldKind::DateTime, true),
                col("evaluation_result", FieldKind::Analysis, true),
                col("notes", FieldKind::Notes, false),
                col("xray_url", FieldKind::FileRef, false),
            ],
        }
    }

    /// Derive a schema from the first record's key set (minus the reserved
    /// internal key). An empty or keyless input yields an empty schema — the
    /// grid's empty state, never a panic.
    pub fn infer(records: &[Value]) -> Self {
        let Some(first) = records.first().and_then(Value::as_object) else {
            return Self::default();
        };
        Self {
            columns: first
                .keys()
                .filter(|key| key.as_str() != RESERVED_KEY)
                .map(|key| {
                    ColumnSpec::new(key, header_label(key), FieldKind::for_key(key), true)
                })
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn column(&self, key: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|c| c.key == key)
    }
}

/// Active sort.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortState {
    pub key: String,
    pub descending: bool,
}

/// Convert domain records into grid rows.
pub fn rows_from_procedures(procedures: &[Procedure]) -> Vec<Value> {
    procedures
        .iter()
        .filter_map(|p| serde_json::to_value(p).ok())
        .collect()
}

/// The table model: rows + view state (filter, visibility, sort, page).
#[derive(Debug)]
pub struct TableModel {
    schema: TableSchema,
    inferred: bool,
    rows: Vec<Value>,
    global_filter: String,
    hidden: HashSet<String>,
    sort: Option<SortState>,
    page: usize,
    page_size: usize,
}

impl TableModel {
    pub fn new(schema: TableSchema, rows: Vec<Value>) -> Self {
        let sort = schema
            .column("created_at")
            .map(|c| SortState {
                key: c.key.clone(),
                descending: true,
            });
        Self {
            schema,
            inferred: false,
            rows,
            global_filter: String::new(),
            hidden: HashSet::new(),
            sort,
            page: 0,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Model whose column set is derived from the rows themselves.
    pub fn with_inferred_schema(rows: Vec<Value>) -> Self {
        let mut model = Self::new(TableSchema::infer(&rows), rows);
        model.inferred = true;
        model
    }

    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    /// Replace the row set. Inferred schemas re-derive their column set;
    /// declared schemas stay as declared. The page resets either way.
    pub fn set_rows(&mut self, rows: Vec<Value>) {
        if self.inferred {
            self.schema = TableSchema::infer(&rows);
        }
        self.rows = rows;
        self.page = 0;
    }

    pub fn set_page_size(&mut self, size: usize) {
        self.page_size = size.max(1);
        self.page = 0;
    }

    // ── Global filter ──

    pub fn global_filter(&self) -> &str {
        &self.global_filter
    }

    pub fn set_global_filter(&mut self, needle: &str) {
        self.global_filter = needle.to_string();
        self.page = 0;
    }

    // ── Column visibility ──

    pub fn is_visible(&self, key: &str) -> bool {
        !self.hidden.contains(key)
    }

    pub fn toggle_column(&mut self, key: &str) {
        if !self.hidden.remove(key) {
            self.hidden.insert(key.to_string());
        }
    }

    pub fn visible_columns(&self) -> Vec<&ColumnSpec> {
        self.schema
            .columns
            .iter()
            .filter(|c| self.is_visible(&c.key))
            .collect()
    }

    // ── Sorting ──

    pub fn sort_state(&self) -> Option<&SortState> {
        self.sort.as_ref()
    }

    /// Toggle sorting on a column: first press uses the kind's preferred
    /// direction, the second flips it. Non-sortable columns are ignored.
    pub fn toggle_sort(&mut self, key: &str) {
        let Some(column) = self.schema.column(key) else {
            return;
        };
        if !column.sortable {
            return;
        }
        let descending_first = column.kind.descending_first();
        self.sort = match self.sort.take() {
            Some(state) if state.key == key => Some(SortState {
                key: state.key,
                descending: !state.descending,
            }),
            _ => Some(SortState {
                key: key.to_string(),
                descending: descending_first,
            }),
        };
    }

    fn compare(a: &Value, b: &Value, column: &ColumnSpec) -> std::cmp::Ordering {
        use std::cmp::Ordering;
        match column.kind {
            FieldKind::DateTime => {
                let parse = |v: &Value| {
                    v.get(&column.key)
                        .and_then(Value::as_str)
                        .and_then(render::parse_temporal)
                };
                match (parse(a), parse(b)) {
                    (Some(x), Some(y)) => x.cmp(&y),
                    // Unparsable dates always sort to the end.
                    (None, Some(_)) => Ordering::Greater,
                    (Some(_), None) => Ordering::Less,
                    (None, None) => Ordering::Equal,
                }
            }
            FieldKind::Status | FieldKind::Analysis => {
                Self::status_ordinal(a, column).cmp(&Self::status_ordinal(b, column))
            }
            _ => {
                let text = |v: &Value| render::search_text(v, column).to_lowercase();
                text(a).cmp(&text(b))
            }
        }
    }

    fn status_ordinal(record: &Value, column: &ColumnSpec) -> u8 {
        let label = match column.kind {
            FieldKind::Analysis => record
                .get(&column.key)
                .and_then(|e| e.get("approval_status"))
                .and_then(Value::as_str),
            _ => record.get(&column.key).and_then(Value::as_str),
        };
        label
            .map(ApprovalStatus::from_label)
            .unwrap_or(ApprovalStatus::Unknown)
            .ordinal()
    }

    // ── Derived views ──

    /// Rows after the global filter and sort, before pagination.
    pub fn filtered_rows(&self) -> Vec<&Value> {
        let needle = self.global_filter.trim().to_lowercase();
        let columns = self.visible_columns();

        let mut rows: Vec<&Value> = self
            .rows
            .iter()
            .filter(|&row| {
                needle.is_empty()
                    || columns.iter().any(|c| {
                        render::search_text(row, c).to_lowercase().contains(&needle)
                    })
            })
            .collect();

        if let Some(ref sort) = self.sort {
            if let Some(column) = self.schema.column(&sort.key) {
                // Stable sort: equal keys keep their incoming order. The
                // direction flip applies to comparable values only; invalid
                // dates stay last either way.
                rows.sort_by(|&a, &b| {
                    let ordering = Self::compare(a, b, column);
                    if sort.descending {
                        match column.kind {
                            FieldKind::DateTime => {
                                let has = |v: &Value| {
                                    v.get(&column.key)
                                        .and_then(Value::as_str)
                                        .and_then(render::parse_temporal)
                                        .is_some()
                                };
                                if has(a) && has(b) {
                                    ordering.reverse()
                                } else {
                                    ordering
                                }
                            }
                            _ => ordering.reverse(),
                        }
                    } else {
                        ordering
                    }
                });
            }
        }

        rows
    }

    /// Number of rows matching the current filter.
    pub fn row_count(&self) -> usize {
        self.filtered_rows().len()
    }

    /// The grid's defined "no data" state.
    pub fn is_empty_state(&self) -> bool {
        self.schema.is_empty() || self.rows.is_empty()
    }

    // ── Pagination ──

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_count(&self) -> usize {
        self.row_count().div_ceil(self.page_size).max(1)
    }

    pub fn can_prev_page(&self) -> bool {
        self.page > 0
    }

    pub fn can_next_page(&self) -> bool {
        self.page + 1 < self.page_count()
    }

    pub fn prev_page(&mut self) {
        if self.can_prev_page() {
            self.page -= 1;
        }
    }

    pub fn next_page(&mut self) {
        if self.can_next_page() {
            self.page += 1;
        }
    }

    /// The current page of rows.
    pub fn page_rows(&self) -> Vec<&Value> {
        let rows = self.filtered_rows();
        let start = (self.page * self.page_size).min(rows.len());
        let end = (start + self.page_size).min(rows.len());
        rows[start..end].to_vec()
    }
}
