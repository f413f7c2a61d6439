//! Schema validation and row conversion for the watched listing.

use thiserror::Error;

use crate::table::{parse_listing, ListingTable, ParseError};

/// Title the upstream listing page is required to carry.
pub const EXPECTED_TITLE: &str = "Index of /liveMedia/public";

/// Header row of the upstream listing table.
///
/// The two trailing empty cells come from the server's `<th colspan>`
/// separator rows, which carry no text of their own but still register as
/// header cells.
pub const EXPECTED_HEADERS: [&str; 7] = ["", "Name", "Last modified", "Size", "Description", "", ""];

/// One file entry of a listing snapshot.
///
/// All fields are opaque strings compared by exact equality; `name` is the
/// natural key within one snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    pub name: String,
    pub last_modified: String,
    pub size: String,
    pub description: String,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("listing title mismatch: expected {EXPECTED_TITLE:?}, found {found:?}")]
    TitleMismatch { found: Option<String> },
    #[error("listing header row mismatch: found {found:?}")]
    HeaderMismatch { found: Vec<String> },
}

/// Failure of the parse-then-extract pipeline over one page.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ListingError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// Convert a parsed table into the file inventory it describes.
///
/// The column layout is fixed: index 0 is the icon column, indices 1..=4
/// carry name, last-modified, size and description. Values are trimmed of
/// leading and trailing whitespace (`&nbsp;` placeholders trim to empty) but
/// otherwise untouched. Rows shorter than five cells are out of contract
/// here; the parser is expected to have been fed a well-formed listing.
pub fn file_infos_from_table(table: &ListingTable) -> Result<Vec<FileInfo>, SchemaError> {
    if table.title.as_deref() != Some(EXPECTED_TITLE) {
        return Err(SchemaError::TitleMismatch {
            found: table.title.clone(),
        });
    }
    if table.headers != EXPECTED_HEADERS {
        return Err(SchemaError::HeaderMismatch {
            found: table.headers.clone(),
        });
    }

    let file_infos = table
        .rows
        .iter()
        .map(|row| FileInfo {
            name: row[1].trim().to_string(),
            last_modified: row[2].trim().to_string(),
            size: row[3].trim().to_string(),
            description: row[4].trim().to_string(),
        })
        .collect();

    Ok(file_infos)
}

/// Parse a raw listing page straight into its file inventory.
pub fn parse_inventory(html: &str) -> Result<Vec<FileInfo>, ListingError> {
    let table = parse_listing(html)?;
    Ok(file_infos_from_table(&table)?)
}
