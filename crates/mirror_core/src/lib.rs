//! Mirror core: strict listing-page parsing and inventory diffing.
mod diff;
mod inventory;
mod scan;
mod table;

pub use diff::{diff_inventories, Change, DiffEntry};
pub use inventory::{
    file_infos_from_table, parse_inventory, FileInfo, ListingError, SchemaError, EXPECTED_HEADERS,
    EXPECTED_TITLE,
};
pub use scan::{MarkupEvent, Scanner};
pub use table::{parse_listing, ListingTable, ParseError, TableBuilder};
