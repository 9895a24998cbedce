use crate::dataset::Dataset;
use crate::error::LoadError;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// File formats the analyzer knows how to parse
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
}

impl FileFormat {
    /// Pick a format from a file name's extension, ignoring case
    ///
    /// # Examples
    /// ```
    /// use analyzer::loader::FileFormat;
    ///
    /// assert_eq!(FileFormat::from_file_name("people.CSV"), Some(FileFormat::Csv));
    /// assert_eq!(FileFormat::from_file_name("people.json"), None);
    /// assert_eq!(FileFormat::from_file_name("people"), None);
    /// ```
    pub fn from_file_name(name: &str) -> Option<Self> {
        Self::from_path(Path::new(name))
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        match extension_of(path).as_deref() {
            Some("csv") => Some(FileFormat::Csv),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            FileFormat::Csv => "csv",
        }
    }
}

/// Lowercased extension of a path, if it has one
pub fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
}

/// Load a dataset from a CSV file
///
/// The file is streamed through a buffered reader. The first record is the
/// header; each later record becomes one row keyed by those names.
///
/// # Arguments
/// * `filepath` - Path to the CSV file to load
///
/// # Returns
/// * `Result<Dataset, LoadError>` - The parsed rows, or an IO/CSV error
///
/// Bytes that are not valid UTF-8 are replaced with U+FFFD rather than
/// failing the load.
///
/// # Errors
/// * A record whose field count differs from the header's
///
/// # Examples
/// ```no_run
/// use analyzer::loader::from_csv;
///
/// match from_csv("data.csv") {
///     Ok(data) => println!("Loaded {} rows", data.len()),
///     Err(e) => eprintln!("Error loading CSV: {}", e),
/// }
/// ```
pub fn from_csv(filepath: impl AsRef<Path>) -> Result<Dataset, LoadError> {
    let file = File::open(filepath)?;
    from_reader(BufReader::new(file))
}

/// Parse CSV from any reader, with the same rules as [`from_csv`]
pub fn from_reader<R: Read>(reader: R) -> Result<Dataset, LoadError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(reader);

    let mut dataset = Dataset::new(rdr.byte_headers()?.iter().map(lossy));

    let mut record = csv::ByteRecord::new();
    while rdr.read_byte_record(&mut record)? {
        dataset.push_row(record.iter().map(lossy));
    }

    tracing::debug!(
        columns = dataset.columns().len(),
        rows = dataset.len(),
        "parsed csv"
    );

    Ok(dataset)
}

fn lossy(field: &[u8]) -> String {
    String::from_utf8_lossy(field).into_owned()
}

/// Detect file type and load the appropriate format
///
/// # Arguments
/// * `filepath` - Path to the file to load
///
/// # Returns
/// * `Result<Dataset, LoadError>` - The loaded rows, or
///   [`LoadError::UnsupportedFormat`] when no parser matches the extension
///
/// # Examples
/// ```no_run
/// use analyzer::loader::load_dataset;
///
/// match load_dataset("data.csv") {
///     Ok(data) => println!("Successfully loaded {} rows", data.len()),
///     Err(e) => eprintln!("Error loading file: {}", e),
/// }
/// ```
pub fn load_dataset(filepath: impl AsRef<Path>) -> Result<Dataset, LoadError> {
    let path = filepath.as_ref();

    match FileFormat::from_path(path) {
        Some(format) => load_format(path, format),
        None => Err(LoadError::UnsupportedFormat {
            extension: extension_of(path),
        }),
    }
}

/// Load a file with an already chosen parser
pub fn load_format(filepath: impl AsRef<Path>, format: FileFormat) -> Result<Dataset, LoadError> {
    match format {
        FileFormat::Csv => from_csv(filepath),
    }
}
