use mirror_core::{
    file_infos_from_table, parse_inventory, FileInfo, ListingError, ListingTable, SchemaError,
    EXPECTED_HEADERS, EXPECTED_TITLE,
};
use pretty_assertions::assert_eq;

fn expected_headers() -> Vec<String> {
    EXPECTED_HEADERS.iter().map(|h| h.to_string()).collect()
}

#[test]
fn wrong_title_is_rejected() {
    let table = ListingTable {
        title: Some("Index of /wrong".to_string()),
        headers: expected_headers(),
        rows: Vec::new(),
    };
    let err = file_infos_from_table(&table).unwrap_err();
    assert_eq!(
        err,
        SchemaError::TitleMismatch {
            found: Some("Index of /wrong".to_string())
        }
    );
}

#[test]
fn missing_title_is_rejected() {
    let table = ListingTable::default();
    let err = file_infos_from_table(&table).unwrap_err();
    assert_eq!(err, SchemaError::TitleMismatch { found: None });
}

#[test]
fn wrong_header_row_is_rejected() {
    let headers: Vec<String> = ["", "Name", "Last modified", "Size", "WRONG", "", ""]
        .iter()
        .map(|h| h.to_string())
        .collect();
    let table = ListingTable {
        title: Some(EXPECTED_TITLE.to_string()),
        headers: headers.clone(),
        rows: Vec::new(),
    };
    let err = file_infos_from_table(&table).unwrap_err();
    assert_eq!(err, SchemaError::HeaderMismatch { found: headers });
}

#[test]
fn rows_convert_with_trimmed_fields() {
    let table = ListingTable {
        title: Some(EXPECTED_TITLE.to_string()),
        headers: expected_headers(),
        rows: vec![vec![
            "".to_string(),
            "live555-latest-sha1.txt".to_string(),
            "2023-03-30 08:47  ".to_string(),
            "  41".to_string(),
            "\u{a0}".to_string(),
        ]],
    };
    let file_infos = file_infos_from_table(&table).unwrap();
    assert_eq!(
        file_infos,
        vec![FileInfo {
            name: "live555-latest-sha1.txt".to_string(),
            last_modified: "2023-03-30 08:47".to_string(),
            size: "41".to_string(),
            description: String::new(),
        }]
    );
}

const SMALL_LISTING: &str = r#"<!DOCTYPE HTML PUBLIC "-//W3C//DTD HTML 3.2 Final//EN">
<html>
 <head>
  <title>Index of /liveMedia/public</title>
 </head>
 <body>
<h1>Index of /liveMedia/public</h1>
  <table>
   <tr><th valign="top"><img src="/icons/blank.gif" alt="[ICO]"></th><th><a href="?C=N;O=D">Name</a></th><th><a href="?C=M;O=A">Last modified</a></th><th><a href="?C=S;O=A">Size</a></th><th><a href="?C=D;O=A">Description</a></th></tr>
   <tr><th colspan="5"><hr></th></tr>
<tr><td valign="top"><img src="/icons/back.gif" alt="[PARENTDIR]"></td><td><a href="/liveMedia/">Parent Directory</a></td><td>&nbsp;</td><td align="right">  - </td><td>&nbsp;</td></tr>
<tr><td valign="top"><img src="/icons/compressed.gif" alt="[   ]"></td><td><a href="live555-latest.tar.gz">live555-latest.tar.gz</a></td><td align="right">2023-03-30 08:47  </td><td align="right">711K</td><td>&nbsp;</td></tr>
   <tr><th colspan="5"><hr></th></tr>
</table>
<address>Apache Server at www.live555.com Port 80</address>
</body></html>
"#;

#[test]
fn full_page_parses_into_an_inventory() {
    let file_infos = parse_inventory(SMALL_LISTING).unwrap();
    assert_eq!(
        file_infos,
        vec![
            FileInfo {
                name: "Parent Directory".to_string(),
                last_modified: String::new(),
                size: "-".to_string(),
                description: String::new(),
            },
            FileInfo {
                name: "live555-latest.tar.gz".to_string(),
                last_modified: "2023-03-30 08:47".to_string(),
                size: "711K".to_string(),
                description: String::new(),
            },
        ]
    );
}

#[test]
fn page_with_wrong_title_fails_as_schema_mismatch() {
    let page = SMALL_LISTING.replace("Index of /liveMedia/public", "Index of /wrong");
    let err = parse_inventory(&page).unwrap_err();
    assert!(matches!(
        err,
        ListingError::Schema(SchemaError::TitleMismatch { .. })
    ));
}
