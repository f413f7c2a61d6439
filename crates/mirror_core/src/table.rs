//! Strict table parser for the single-table listing pages.

use thiserror::Error;

use crate::scan::{MarkupEvent, Scanner};

/// Structured contents of the one table a listing page may carry.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListingTable {
    pub title: Option<String>,
    pub headers: Vec<String>,
    /// Rows keep their cells in document order; short rows are not padded.
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("unexpected <{tag}> start tag")]
    UnexpectedOpen { tag: String },
    #[error("unexpected </{tag}> end tag")]
    UnexpectedClose { tag: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum ScanState {
    #[default]
    None,
    InTitle,
    InTable,
    InTableRow,
    InHeaderCell,
    InDataCell,
}

/// The tags with structural meaning; everything else passes through unseen.
#[derive(Debug, Clone, Copy)]
enum Tag {
    Title,
    Table,
    Tr,
    Th,
    Td,
}

fn classify(name: &str) -> Option<Tag> {
    if name.eq_ignore_ascii_case("title") {
        Some(Tag::Title)
    } else if name.eq_ignore_ascii_case("table") {
        Some(Tag::Table)
    } else if name.eq_ignore_ascii_case("tr") {
        Some(Tag::Tr)
    } else if name.eq_ignore_ascii_case("th") {
        Some(Tag::Th)
    } else if name.eq_ignore_ascii_case("td") {
        Some(Tag::Td)
    } else {
        None
    }
}

/// Finite state machine over markup events, accumulating one [`ListingTable`].
///
/// The state and every accumulator live in this value, so the machine can be
/// driven directly in tests without a document scanner. One table and one
/// title per document; a structural tag in any other position is an error
/// rather than something to recover from, so upstream page-format changes
/// surface instead of being silently absorbed.
#[derive(Debug, Default)]
pub struct TableBuilder {
    state: ScanState,
    table: ListingTable,
    row: Vec<String>,
    cell: String,
}

impl TableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle a start tag.
    pub fn open_tag(&mut self, name: &str) -> Result<(), ParseError> {
        let Some(tag) = classify(name) else {
            return Ok(());
        };
        let unexpected = || ParseError::UnexpectedOpen {
            tag: name.to_ascii_lowercase(),
        };
        match tag {
            Tag::Title => {
                if self.state != ScanState::None {
                    return Err(unexpected());
                }
                self.state = ScanState::InTitle;
            }
            Tag::Table => {
                if self.state != ScanState::None {
                    return Err(unexpected());
                }
                self.state = ScanState::InTable;
            }
            Tag::Tr => {
                if self.state != ScanState::InTable {
                    return Err(unexpected());
                }
                self.state = ScanState::InTableRow;
            }
            Tag::Th => {
                // A <th> while a cell is open lands here too: the state is a
                // cell state, not InTableRow.
                if self.state != ScanState::InTableRow {
                    return Err(unexpected());
                }
                self.cell.clear();
                self.state = ScanState::InHeaderCell;
            }
            Tag::Td => {
                if self.state != ScanState::InTableRow {
                    return Err(unexpected());
                }
                self.cell.clear();
                self.state = ScanState::InDataCell;
            }
        }
        Ok(())
    }

    /// Handle an end tag.
    pub fn close_tag(&mut self, name: &str) -> Result<(), ParseError> {
        let Some(tag) = classify(name) else {
            return Ok(());
        };
        let unexpected = || ParseError::UnexpectedClose {
            tag: name.to_ascii_lowercase(),
        };
        match tag {
            Tag::Title => {
                if self.state != ScanState::InTitle {
                    return Err(unexpected());
                }
                self.state = ScanState::None;
            }
            Tag::Table => {
                if self.state != ScanState::InTable {
                    return Err(unexpected());
                }
                self.state = ScanState::None;
            }
            Tag::Tr => {
                if self.state != ScanState::InTableRow {
                    return Err(unexpected());
                }
                self.state = ScanState::InTable;
                // A row with zero cells produces no entry at all.
                if !self.row.is_empty() {
                    self.table.rows.push(std::mem::take(&mut self.row));
                }
            }
            Tag::Th => {
                if self.state != ScanState::InHeaderCell {
                    return Err(unexpected());
                }
                self.table.headers.push(std::mem::take(&mut self.cell));
                self.state = ScanState::InTableRow;
            }
            Tag::Td => {
                if self.state != ScanState::InDataCell {
                    return Err(unexpected());
                }
                self.row.push(std::mem::take(&mut self.cell));
                self.state = ScanState::InTableRow;
            }
        }
        Ok(())
    }

    /// Handle a text run.
    ///
    /// Inside a cell the run is appended, so inline markup wrapping a
    /// filename contributes its text to the same cell. Text anywhere else in
    /// the document has no structural meaning and is ignored.
    pub fn text(&mut self, data: &str) {
        match self.state {
            ScanState::InTitle => self.table.title = Some(data.to_string()),
            ScanState::InHeaderCell | ScanState::InDataCell => self.cell.push_str(data),
            _ => {}
        }
    }

    /// Finish the parse and hand out the accumulated table.
    pub fn finish(self) -> ListingTable {
        self.table
    }
}

/// Parse a full document into its single table.
pub fn parse_listing(html: &str) -> Result<ListingTable, ParseError> {
    let mut builder = TableBuilder::new();
    for event in Scanner::new(html) {
        match event {
            MarkupEvent::Open(name) => builder.open_tag(name)?,
            MarkupEvent::Close(name) => builder.close_tag(name)?,
            MarkupEvent::Text(data) => builder.text(&data),
        }
    }
    Ok(builder.finish())
}
