/*!
# CSV Analyzer

Upload a CSV file from the browser and browse it as a sortable table.

## Overview

The server accepts one file per request, parses it into rows keyed by the
header line and answers with JSON. The page that ships with the server
renders those rows as a table and re-sorts them when a column header is
clicked.

## Architecture

### Frontend Layer
- **Technologies**: HTML, JavaScript
- **Key Components**:
  - Upload form - file picker and Analyze button
  - Results table - one header per column, click to sort

### Backend Layer
- **Technologies**: Rust, axum, tokio
- **Core Components**:
  - Upload handler - streams the multipart `file` field to a temp file
  - Loader - picks a parser from the extension and builds a [`Dataset`]
  - Error mapping - turns failures into JSON error bodies

### Temporary storage
- Each upload gets its own file named by a random id
- The file is removed when the request finishes, whatever the outcome

## Modules

- **dataset**: column list plus string rows, serialized as `Row[]`
- **loader**: file type detection and CSV parsing
- **upload**: per-request temp file guard
- **sort**: single-column stable sorting with pluggable comparators
- **view**: model of the upload form and results table
- **error**: load and request errors
- **config**: server settings
- **app**: routing and server startup

## REST API Endpoints

- `GET /` - Upload page
- `POST /api/analyze` - Multipart form with a `file` field; returns `{"data": Row[]}`
- `GET /health` - Liveness check
*/

pub mod dataset;
pub mod error;
pub mod loader;
pub mod sort;
pub mod upload;
pub mod view;

#[cfg(feature = "web")]
pub mod app;
#[cfg(feature = "web")]
pub mod config;

pub use dataset::{Dataset, Row};
pub use error::LoadError;
pub use loader::{FileFormat, load_dataset};
pub use sort::{CellComparator, Lexical, Numeric, SortDirection, SortState, Sorter};
pub use upload::{TempUpload, UploadDir};
pub use view::{TableView, ViewState};
