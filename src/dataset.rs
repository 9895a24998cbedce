use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use std::fmt;

/// Tabular data parsed from one uploaded file
///
/// Columns are discovered at parse time from the header row and kept in
/// source order. Every row holds exactly one cell per column, so the column
/// names are stored once instead of once per row.
///
/// On the wire a dataset is an array of objects, one per row, with keys in
/// column order:
///
/// ```
/// use analyzer::dataset::Dataset;
///
/// let mut data = Dataset::new(["name", "age"]);
/// data.push_row(["Alice", "30"]);
///
/// let json = serde_json::to_string(&data).unwrap();
/// assert_eq!(json, r#"[{"name":"Alice","age":"30"}]"#);
/// ```
#[derive(Clone, Debug, Default)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
    /// Column slot for each field position of the source header.
    slots: Vec<usize>,
}

/// Borrowed view of a single row
#[derive(Clone, Copy, Debug)]
pub struct Row<'a> {
    columns: &'a [String],
    cells: &'a [String],
}

impl Dataset {
    /// Create an empty dataset from a header row
    ///
    /// Repeated header names collapse into one column that keeps the
    /// position of its first occurrence. When rows are pushed, the value
    /// of the last field carrying that name wins.
    ///
    /// # Arguments
    /// * `header` - Column names in source order
    pub fn new<I, S>(header: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut columns: Vec<String> = Vec::new();
        let mut slots = Vec::new();

        for name in header {
            let name = name.into();
            match columns.iter().position(|c| *c == name) {
                Some(idx) => slots.push(idx),
                None => {
                    slots.push(columns.len());
                    columns.push(name);
                }
            }
        }

        Dataset {
            columns,
            rows: Vec::new(),
            slots,
        }
    }

    /// Append one record, mapping its fields onto columns by header position
    ///
    /// Missing trailing fields leave empty cells; fields beyond the header
    /// are dropped.
    pub fn push_row<I, S>(&mut self, fields: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut cells = vec![String::new(); self.columns.len()];
        for (slot, value) in self.slots.iter().zip(fields) {
            cells[*slot] = value.into();
        }
        self.rows.push(cells);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn row(&self, index: usize) -> Option<Row<'_>> {
        self.rows.get(index).map(|cells| Row {
            columns: &self.columns,
            cells,
        })
    }

    pub fn rows(&self) -> impl ExactSizeIterator<Item = Row<'_>> + '_ {
        self.rows.iter().map(move |cells| Row {
            columns: &self.columns,
            cells,
        })
    }

    /// Values of one column, top to bottom. Empty if the column is unknown.
    pub fn column_values(&self, name: &str) -> Vec<&str> {
        match self.column_index(name) {
            Some(idx) => self.rows.iter().map(|r| r[idx].as_str()).collect(),
            None => Vec::new(),
        }
    }

    pub(crate) fn rows_mut(&mut self) -> &mut Vec<Vec<String>> {
        &mut self.rows
    }
}

impl PartialEq for Dataset {
    fn eq(&self, other: &Self) -> bool {
        self.columns == other.columns && self.rows == other.rows
    }
}

impl Eq for Dataset {}

impl<'a> Row<'a> {
    pub fn get(&self, column: &str) -> Option<&'a str> {
        let cells: &'a [String] = self.cells;
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|idx| cells[idx].as_str())
    }

    /// `(column, value)` pairs in column order
    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
        let (columns, cells): (&'a [String], &'a [String]) = (self.columns, self.cells);
        columns
            .iter()
            .map(String::as_str)
            .zip(cells.iter().map(String::as_str))
    }

    pub fn values(&self) -> &'a [String] {
        self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl Serialize for Row<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.cells.len()))?;
        for (column, value) in self.iter() {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

impl Serialize for Dataset {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.rows.len()))?;
        for row in self.rows() {
            seq.serialize_element(&row)?;
        }
        seq.end()
    }
}

// Keeps object keys in document order, which serde_json's Map does not.
struct OrderedRow(Vec<(String, String)>);

impl<'de> Deserialize<'de> for OrderedRow {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RowVisitor;

        impl<'de> Visitor<'de> for RowVisitor {
            type Value = OrderedRow;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an object of string cells")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<OrderedRow, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((key, value)) = access.next_entry::<String, String>()? {
                    entries.push((key, value));
                }
                Ok(OrderedRow(entries))
            }
        }

        deserializer.deserialize_map(RowVisitor)
    }
}

impl<'de> Deserialize<'de> for Dataset {
    /// The first object's keys define the columns. Keys missing from a later
    /// object become empty cells; keys it adds are an error.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct DatasetVisitor;

        impl<'de> Visitor<'de> for DatasetVisitor {
            type Value = Dataset;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an array of row objects")
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Dataset, A::Error> {
                let mut dataset: Option<Dataset> = None;

                while let Some(OrderedRow(entries)) = seq.next_element()? {
                    let data = dataset.get_or_insert_with(|| {
                        Dataset::new(entries.iter().map(|(k, _)| k.clone()))
                    });

                    let mut cells = vec![String::new(); data.columns.len()];
                    for (key, value) in entries {
                        let idx = data.column_index(&key).ok_or_else(|| {
                            de::Error::custom(format!("unexpected column `{}`", key))
                        })?;
                        cells[idx] = value;
                    }
                    data.rows.push(cells);
                }

                Ok(dataset.unwrap_or_default())
            }
        }

        deserializer.deserialize_seq(DatasetVisitor)
    }
}
