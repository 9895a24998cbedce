use crate::dataset::Dataset;
use crate::sort::{SortState, Sorter};
use std::fmt::Write;
use thiserror::Error;

/// Extensions offered by the file picker
pub const ACCEPTED_EXTENSIONS: &[&str] = &[".csv"];

/// Endpoint the view submits to
pub const ANALYZE_PATH: &str = "/api/analyze";

/// Multipart field carrying the file
pub const FILE_FIELD: &str = "file";

/// Shown when Analyze is pressed with no file picked
pub const NO_FILE_MESSAGE: &str = "Please select a file first";
/// Shown when the server answers with a non-2xx status
pub const BAD_STATUS_MESSAGE: &str = "Failed to analyze file";
/// Shown when the request fails without a message of its own
pub const FALLBACK_MESSAGE: &str = "Error analyzing file";

pub const IDLE_LABEL: &str = "Analyze";
pub const LOADING_LABEL: &str = "Analyzing...";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewState {
    Idle,
    FileSelected,
    Loading,
    Displaying,
    Error,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ViewError {
    #[error("Please select a file first")]
    NoFileSelected,
}

/// Why an analyze request did not produce rows
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FetchError {
    /// The server answered with a non-success status
    Status(u16),
    /// The request never completed
    Network(String),
}

impl FetchError {
    /// Text shown to the user
    pub fn message(&self) -> &str {
        match self {
            FetchError::Status(_) => BAD_STATUS_MESSAGE,
            FetchError::Network(msg) if !msg.is_empty() => msg.as_str(),
            FetchError::Network(_) => FALLBACK_MESSAGE,
        }
    }
}

/// What the view asks the transport to send
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmitRequest {
    pub path: &'static str,
    pub field: &'static str,
    pub file_name: String,
}

/// One column header as displayed
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeaderLabel {
    pub column: String,
    pub label: String,
}

/// Client-side model of the upload form and results table
///
/// Holds the chosen file, the last successfully loaded rows, the current
/// sort and any error message. Only one request is assumed in flight; a
/// second [`submit`](Self::submit) while loading is not rejected.
pub struct TableView {
    state: ViewState,
    file: Option<String>,
    data: Dataset,
    sort: Option<SortState>,
    error: Option<String>,
    sorter: Sorter,
}

impl Default for TableView {
    fn default() -> Self {
        Self::with_sorter(Sorter::default())
    }
}

impl TableView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sorter(sorter: Sorter) -> Self {
        TableView {
            state: ViewState::Idle,
            file: None,
            data: Dataset::default(),
            sort: None,
            error: None,
            sorter,
        }
    }

    pub fn state(&self) -> ViewState {
        self.state
    }

    pub fn data(&self) -> &Dataset {
        &self.data
    }

    pub fn sort_state(&self) -> Option<&SortState> {
        self.sort.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.state == ViewState::Loading
    }

    pub fn button_label(&self) -> &'static str {
        if self.is_loading() { LOADING_LABEL } else { IDLE_LABEL }
    }

    /// Remember the file picked by the user
    pub fn select_file(&mut self, name: impl Into<String>) {
        self.file = Some(name.into());
        if self.state == ViewState::Idle {
            self.state = ViewState::FileSelected;
        }
    }

    /// Start an upload of the selected file
    ///
    /// # Errors
    /// * [`ViewError::NoFileSelected`] when nothing was picked; the message
    ///   is also shown in the view
    pub fn submit(&mut self) -> Result<SubmitRequest, ViewError> {
        let Some(file_name) = self.file.clone() else {
            self.error = Some(NO_FILE_MESSAGE.to_string());
            self.state = ViewState::Error;
            return Err(ViewError::NoFileSelected);
        };

        self.error = None;
        self.state = ViewState::Loading;

        Ok(SubmitRequest {
            path: ANALYZE_PATH,
            field: FILE_FIELD,
            file_name,
        })
    }

    /// Apply the outcome of an upload
    ///
    /// New rows replace the old ones wholesale and drop the sort. A failure
    /// keeps whatever rows were already shown.
    pub fn receive(&mut self, outcome: Result<Dataset, FetchError>) {
        match outcome {
            Ok(data) => {
                self.data = data;
                self.sort = None;
                self.error = None;
                self.state = ViewState::Displaying;
            }
            Err(e) => {
                self.error = Some(e.message().to_string());
                self.state = ViewState::Error;
            }
        }
    }

    /// Sort the displayed rows by `column`
    ///
    /// Returns the new sort, or `None` when there are no rows to sort.
    pub fn click_header(&mut self, column: &str) -> Option<&SortState> {
        if self.data.is_empty() {
            return None;
        }

        let next = SortState::next(self.sort.as_ref(), column);
        self.sorter.sort(&mut self.data, &next);
        self.sort = Some(next);
        self.sort.as_ref()
    }

    /// Header labels, with an arrow on the active sort column
    pub fn headers(&self) -> Vec<HeaderLabel> {
        self.data
            .columns()
            .iter()
            .map(|column| {
                let label = match &self.sort {
                    Some(s) if s.column == *column => format!("{} {}", column, s.direction.arrow()),
                    _ => column.clone(),
                };
                HeaderLabel {
                    column: column.clone(),
                    label,
                }
            })
            .collect()
    }

    /// Markup for the error line and the results section
    pub fn render_html(&self) -> String {
        let mut html = String::new();

        if let Some(err) = &self.error {
            let _ = write!(html, "<p style=\"color: red\">{}</p>", escape_html(err));
        }

        html.push_str("<div><h2>Analysis Results</h2>");
        if self.data.is_empty() {
            html.push_str("<p>No data available</p>");
        } else {
            html.push_str("<table border=\"1\"><thead><tr>");
            for header in self.headers() {
                let _ = write!(
                    html,
                    "<th data-column=\"{}\" style=\"cursor: pointer\">{}</th>",
                    escape_html(&header.column),
                    escape_html(&header.label)
                );
            }
            html.push_str("</tr></thead><tbody>");
            for row in self.data.rows() {
                html.push_str("<tr>");
                for value in row.values() {
                    let _ = write!(html, "<td>{}</td>", escape_html(value));
                }
                html.push_str("</tr>");
            }
            html.push_str("</tbody></table>");
        }
        html.push_str("</div>");

        html
    }
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
