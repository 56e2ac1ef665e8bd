use feedrelic::domain::CellValue;
use feedrelic::parser::{FileFormat, ParseError, ParserRegistry, UploadedFile};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

const FIXTURE_XLSX: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/inventory.xlsx");

fn csv_file(contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[tokio::test]
async fn test_csv_file_from_disk() {
    let file = csv_file(
        "name,city,age\n\
         Ada,London,36\n\
         Grace,Arlington,85\n\
         Alan,Wilmslow,41\n\
         Edsger,Nuenen,72\n\
         Barbara,Boston,\n\
         Ken,\"Berkeley, CA\",80\n\
         Dennis,Murray Hill,70\n",
    );

    let upload = UploadedFile::read(file.path(), None).await.unwrap();
    let parsed = ParserRegistry::new().parse(&upload).unwrap();

    assert_eq!(parsed.format, FileFormat::Delimited);
    assert_eq!(parsed.rows.len(), 7);
    assert_eq!(parsed.rows.columns(), vec!["name", "city", "age"]);

    let ken = &parsed.rows.rows()[5];
    assert_eq!(ken.get("city"), Some(&CellValue::from("Berkeley, CA")));
    assert_eq!(ken.get("age"), Some(&CellValue::from("80")));
    // Empty fields are kept as empty text.
    assert_eq!(
        parsed.rows.rows()[4].get("age"),
        Some(&CellValue::from(""))
    );
}

#[tokio::test]
async fn test_xlsx_fixture_keeps_cell_types() {
    let upload = UploadedFile::read(Path::new(FIXTURE_XLSX), None).await.unwrap();
    assert_eq!(upload.name, "inventory.xlsx");

    let parsed = ParserRegistry::new().parse(&upload).unwrap();
    assert_eq!(parsed.format, FileFormat::Spreadsheet);
    assert_eq!(parsed.rows.len(), 3);
    assert_eq!(
        parsed.rows.columns(),
        vec!["sku", "name", "quantity", "in_stock"]
    );

    let rows = parsed.rows.rows();
    assert_eq!(rows[0].get("sku"), Some(&CellValue::from("A-1")));
    // Whole numbers are sent without a fractional part.
    assert_eq!(rows[0].get("quantity"), Some(&CellValue::Integer(12)));
    assert_eq!(rows[0].get("in_stock"), Some(&CellValue::Bool(true)));
    assert_eq!(rows[1].get("quantity"), Some(&CellValue::Number(2.5)));

    // Empty cells are absent from the row.
    assert_eq!(rows[2].len(), 2);
    assert!(rows[2].get("name").is_none());
}

#[tokio::test]
async fn test_declared_type_overrides_extension() {
    let file = csv_file("a,b\n1,2\n");
    let upload = UploadedFile::read(
        file.path(),
        Some("application/vnd.openxmlformats-officedocument.spreadsheetml.sheet".to_string()),
    )
    .await
    .unwrap();

    let err = ParserRegistry::new().parse(&upload).unwrap_err();
    assert!(matches!(err, ParseError::Spreadsheet(_)));
    assert!(err.to_string().starts_with("Error parsing Excel file: "));
}

#[tokio::test]
async fn test_unsupported_file_is_rejected() {
    let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
    file.write_all(b"plain text").unwrap();

    let upload = UploadedFile::read(file.path(), None).await.unwrap();
    let err = ParserRegistry::new().parse(&upload).unwrap_err();
    let message = err.to_string();
    assert!(message.starts_with("Please upload a CSV or Excel file (accepted: .csv, .xlsx, .xls); got "));
    assert!(message.ends_with(".txt"));
}

#[tokio::test]
async fn test_missing_file_is_a_read_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = UploadedFile::read(&dir.path().join("absent.csv"), None)
        .await
        .unwrap_err();
    assert!(matches!(err, ParseError::ReadFailed(_)));
    assert_eq!(err.to_string(), "Error reading file");
}
