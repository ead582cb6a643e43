use std::collections::BTreeMap;
use std::fs::File;
use std::io;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, anyhow};
use arrow::array::{Array, AsArray};
use arrow::datatypes::{
    DataType, Float32Type, Float64Type, Int16Type, Int32Type, Int64Type, Int8Type, UInt16Type,
    UInt32Type, UInt64Type, UInt8Type,
};
use arrow::util::display::array_value_to_string;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use super::error::LoadError;
use super::model::*;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Read and normalize an institution table.  Dispatch by extension.
///
/// Supported formats:
/// * `.parquet` / `.pq` – one flat column per field
/// * `.tsv`             – tab-delimited text with a header row
/// * anything else      – comma-delimited text with a header row
///
/// The first column is renamed to [`NAME_COLUMN`] and the derived
/// acceptance-rate and total-cost columns are appended.
pub fn read_table(path: &Path) -> Result<InstitutionTable, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let file = open_source(path)?;
    let grid = match ext.as_str() {
        "parquet" | "pq" => read_parquet(file)?,
        "tsv" => read_delimited(file, b'\t')?,
        _ => read_delimited(file, b',')?,
    };
    normalize(grid)
}

fn open_source(path: &Path) -> Result<File, LoadError> {
    File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => LoadError::DataSourceMissing {
            path: path.to_path_buf(),
        },
        _ => LoadError::Malformed(
            anyhow::Error::new(e).context(format!("opening {}", path.display())),
        ),
    })
}

/// Header plus untyped cells, common to every input format.
struct CellGrid {
    headers: Vec<String>,
    rows: Vec<Vec<MetadataValue>>,
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Column positions of the typed fields within a [`CellGrid`].
struct Layout {
    private: usize,
    apps: usize,
    accept: usize,
    enroll: Option<usize>,
    grad_rate: usize,
    outstate: usize,
    room_board: usize,
    books: usize,
    personal: usize,
    expend: Option<usize>,
    f_undergrad: Option<usize>,
    phd: Option<usize>,
    top10: Option<usize>,
    alumni: Option<usize>,
    sf_ratio: Option<usize>,
    /// (position, header) of every column without a typed field.
    extra: Vec<(usize, String)>,
}

impl Layout {
    fn resolve(headers: &[String]) -> Result<Self, LoadError> {
        let find = |name: &str| headers.iter().position(|h| h == name);
        let require = |name: &str| {
            find(name).ok_or_else(|| LoadError::MissingColumn {
                column: name.to_string(),
            })
        };

        let mut layout = Layout {
            private: require(PRIVATE_COLUMN)?,
            apps: require(APPS_COLUMN)?,
            accept: require(ACCEPT_COLUMN)?,
            enroll: find(ENROLL_COLUMN),
            grad_rate: require(GRAD_RATE_COLUMN)?,
            outstate: require(OUTSTATE_COLUMN)?,
            room_board: require(ROOM_BOARD_COLUMN)?,
            books: require(BOOKS_COLUMN)?,
            personal: require(PERSONAL_COLUMN)?,
            expend: find(EXPEND_COLUMN),
            f_undergrad: find(F_UNDERGRAD_COLUMN),
            phd: find(PHD_COLUMN),
            top10: find(TOP10_COLUMN),
            alumni: find(ALUMNI_COLUMN),
            sf_ratio: find(SF_RATIO_COLUMN),
            extra: Vec::new(),
        };

        // Position 0 is the name; derived headers get recomputed, not copied.
        let typed = layout.typed_positions();
        layout.extra = headers
            .iter()
            .enumerate()
            .skip(1)
            .filter(|(i, h)| {
                !typed.contains(i)
                    && h.as_str() != ACCEPTANCE_RATE_COLUMN
                    && h.as_str() != TOTAL_COST_COLUMN
            })
            .map(|(i, h)| (i, h.clone()))
            .collect();
        Ok(layout)
    }

    fn typed_positions(&self) -> Vec<usize> {
        let mut positions = vec![
            self.private,
            self.apps,
            self.accept,
            self.grad_rate,
            self.outstate,
            self.room_board,
            self.books,
            self.personal,
        ];
        positions.extend(
            [
                self.enroll,
                self.expend,
                self.f_undergrad,
                self.phd,
                self.top10,
                self.alumni,
                self.sf_ratio,
            ]
            .into_iter()
            .flatten(),
        );
        positions
    }
}

fn normalize(grid: CellGrid) -> Result<InstitutionTable, LoadError> {
    let CellGrid { mut headers, rows } = grid;
    let first = headers
        .first_mut()
        .ok_or_else(|| anyhow!("source has no header row"))?;
    *first = NAME_COLUMN.to_string();

    let layout = Layout::resolve(&headers)?;

    let mut records = Vec::with_capacity(rows.len());
    for (row_no, row) in rows.iter().enumerate() {
        records.push(parse_record(&layout, &headers, row_no, row)?);
    }

    let missing: Vec<String> = VIEW_COLUMNS
        .iter()
        .filter(|c| !headers.iter().any(|h| h == *c))
        .map(|c| c.to_string())
        .collect();

    for derived in [ACCEPTANCE_RATE_COLUMN, TOTAL_COST_COLUMN] {
        if !headers.iter().any(|h| h == derived) {
            headers.push(derived.to_string());
        }
    }

    Ok(InstitutionTable {
        columns: headers,
        records,
        missing,
    })
}

static NULL_CELL: MetadataValue = MetadataValue::Null;

fn parse_record(
    layout: &Layout,
    headers: &[String],
    row_no: usize,
    row: &[MetadataValue],
) -> Result<Institution, LoadError> {
    let cell = |idx: usize| row.get(idx).unwrap_or(&NULL_CELL);
    let invalid = |idx: usize| LoadError::InvalidValue {
        row: row_no,
        column: headers[idx].clone(),
        value: cell(idx).to_string(),
    };
    let float = |idx: usize| cell(idx).as_f64().ok_or_else(|| invalid(idx));
    // An absent view column reads as NaN.
    let view_float = |idx: Option<usize>| idx.map_or(Ok(f64::NAN), |i| float(i));
    // Empty cells are missing counts rather than malformed ones.
    let count = |idx: usize| {
        let value = cell(idx);
        if value.is_null() {
            return Ok(None);
        }
        value.as_count().map(Some).ok_or_else(|| invalid(idx))
    };

    let applications = count(layout.apps)?;
    let accepted = count(layout.accept)?;
    let enrolled = match layout.enroll {
        Some(idx) => count(idx)?,
        None => None,
    };
    let out_of_state_tuition = float(layout.outstate)?;
    let room_board = float(layout.room_board)?;
    let books = float(layout.books)?;
    let personal = float(layout.personal)?;

    let extra: BTreeMap<String, MetadataValue> = layout
        .extra
        .iter()
        .map(|(idx, name)| (name.clone(), cell(*idx).clone()))
        .collect();

    Ok(Institution {
        name: cell(0).to_string(),
        private: cell(layout.private).to_string(),
        applications,
        accepted,
        enrolled,
        completion_rate: float(layout.grad_rate)?,
        out_of_state_tuition,
        room_board,
        books,
        personal,
        instructional_expenditure: view_float(layout.expend)?,
        full_time_undergrads: view_float(layout.f_undergrad)?,
        phd_faculty_pct: view_float(layout.phd)?,
        top10_pct: view_float(layout.top10)?,
        alumni_donation_pct: view_float(layout.alumni)?,
        student_faculty_ratio: view_float(layout.sf_ratio)?,
        acceptance_rate: Institution::acceptance_rate_of(accepted, applications),
        total_cost: Institution::total_cost_of(out_of_state_tuition, room_board, books, personal),
        extra,
    })
}

// ---------------------------------------------------------------------------
// Delimited text loader
// ---------------------------------------------------------------------------

/// Header row with column names; one institution per following row.
fn read_delimited(file: File, delimiter: u8) -> Result<CellGrid, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .from_reader(file);
    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        // The name column stays text even when it looks like a number.
        rows.push(
            record
                .iter()
                .enumerate()
                .map(|(i, s)| match i {
                    0 => MetadataValue::String(s.to_string()),
                    _ => guess_metadata_type(s),
                })
                .collect(),
        );
    }

    Ok(CellGrid { headers, rows })
}

fn guess_metadata_type(s: &str) -> MetadataValue {
    if s.is_empty() {
        return MetadataValue::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return MetadataValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return MetadataValue::Float(f);
    }
    if s == "true" || s == "false" {
        return MetadataValue::Bool(s == "true");
    }
    MetadataValue::String(s.to_string())
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one flat column per source field.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn read_parquet(file: File) -> Result<CellGrid, LoadError> {
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let headers: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for row in 0..batch.num_rows() {
            let mut cells = Vec::with_capacity(batch.num_columns());
            for (i, col) in batch.columns().iter().enumerate() {
                cells.push(match i {
                    0 => name_cell(col, row)?,
                    _ => extract_metadata_value(col, row),
                });
            }
            rows.push(cells);
        }
    }

    Ok(CellGrid { headers, rows })
}

/// The name column as Arrow prints it, whatever its type.
fn name_cell(col: &Arc<dyn Array>, row: usize) -> Result<MetadataValue, LoadError> {
    if col.is_null(row) {
        return Ok(MetadataValue::Null);
    }
    let text = array_value_to_string(col, row).context("formatting name column")?;
    Ok(MetadataValue::String(text))
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_metadata_value(col: &Arc<dyn Array>, row: usize) -> MetadataValue {
    if col.is_null(row) {
        return MetadataValue::Null;
    }
    match col.data_type() {
        DataType::Utf8 => MetadataValue::String(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => {
            MetadataValue::String(col.as_string::<i64>().value(row).to_string())
        }
        DataType::Utf8View => MetadataValue::String(col.as_string_view().value(row).to_string()),
        DataType::Int8 => MetadataValue::Integer(col.as_primitive::<Int8Type>().value(row) as i64),
        DataType::Int16 => {
            MetadataValue::Integer(col.as_primitive::<Int16Type>().value(row) as i64)
        }
        DataType::Int32 => {
            MetadataValue::Integer(col.as_primitive::<Int32Type>().value(row) as i64)
        }
        DataType::Int64 => MetadataValue::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::UInt8 => {
            MetadataValue::Integer(col.as_primitive::<UInt8Type>().value(row) as i64)
        }
        DataType::UInt16 => {
            MetadataValue::Integer(col.as_primitive::<UInt16Type>().value(row) as i64)
        }
        DataType::UInt32 => {
            MetadataValue::Integer(col.as_primitive::<UInt32Type>().value(row) as i64)
        }
        DataType::UInt64 => {
            let v = col.as_primitive::<UInt64Type>().value(row);
            i64::try_from(v).map_or(MetadataValue::Float(v as f64), MetadataValue::Integer)
        }
        DataType::Float32 => {
            MetadataValue::Float(col.as_primitive::<Float32Type>().value(row) as f64)
        }
        DataType::Float64 => MetadataValue::Float(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => MetadataValue::Bool(col.as_boolean().value(row)),
        other => MetadataValue::String(format!("{other:?}")),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::io::Write;

    use arrow::array::{Float64Array, Int64Array, StringArray};
    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;

    use super::*;

    const HEADER: &str = ",Private,Apps,Accept,Enroll,Top10perc,F.Undergrad,Outstate,\
Room.Board,Books,Personal,PhD,S.F.Ratio,perc.alumni,Expend,Grad.Rate";

    fn write_csv(dir: &tempfile::TempDir, name: &str, body: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = File::create(&path).unwrap();
        writeln!(file, "{HEADER}").unwrap();
        write!(file, "{body}").unwrap();
        path
    }

    const TWO_ROWS: &str = "A,Yes,100,20,15,40,1200,10000,5000,500,500,80,12.5,30,9000,90\n\
B,No,200,150,90,10,5000,2000,3000,300,200,60,18.0,10,6000,40\n";

    /// Write the two-institution fixture table to `dir/colleges.csv`.
    pub(crate) fn write_two_row_csv(dir: &tempfile::TempDir) -> std::path::PathBuf {
        write_csv(dir, "colleges.csv", TWO_ROWS)
    }

    #[test]
    fn derives_acceptance_rate_and_total_cost() {
        let dir = tempfile::tempdir().unwrap();
        let table = read_table(&write_csv(&dir, "colleges.csv", TWO_ROWS)).unwrap();

        assert_eq!(table.len(), 2);
        let rates: Vec<f64> = table.values(|r| r.acceptance_rate).collect();
        let costs: Vec<f64> = table.values(|r| r.total_cost).collect();
        assert_eq!(rates, [20.0, 75.0]);
        assert_eq!(costs, [16000.0, 5500.0]);
    }

    #[test]
    fn renames_first_column_and_appends_derived() {
        let dir = tempfile::tempdir().unwrap();
        let table = read_table(&write_csv(&dir, "colleges.csv", TWO_ROWS)).unwrap();

        assert_eq!(table.columns[0], NAME_COLUMN);
        assert_eq!(table.columns[1], PRIVATE_COLUMN);
        let n = table.columns.len();
        assert_eq!(table.columns[n - 2], ACCEPTANCE_RATE_COLUMN);
        assert_eq!(table.columns[n - 1], TOTAL_COST_COLUMN);
        assert_eq!(table.records[0].name, "A");
        assert_eq!(table.records[1].private, "No");
        assert_eq!(table.records[0].enrolled, Some(15));
    }

    #[test]
    fn total_cost_is_literal_sum() {
        let dir = tempfile::tempdir().unwrap();
        let body = "C,Yes,10,3,1,5,100,12345.67,4321.1,0.3,987.65,50,9.9,5,5000,71.5\n";
        let table = read_table(&write_csv(&dir, "colleges.csv", body)).unwrap();
        let r = &table.records[0];
        assert_eq!(r.total_cost, r.out_of_state_tuition + r.room_board + r.books + r.personal);
    }

    #[test]
    fn zero_applications_do_not_abort_the_load() {
        let dir = tempfile::tempdir().unwrap();
        let body = format!(
            "{TWO_ROWS}Z,No,0,0,0,0,10,1000,1000,100,100,20,10.0,1,1000,50\n"
        );
        let table = read_table(&write_csv(&dir, "colleges.csv", &body)).unwrap();
        assert_eq!(table.len(), 3);
        assert!(!table.records[2].acceptance_rate.is_finite());
    }

    #[test]
    fn empty_count_cell_only_affects_its_row() {
        let dir = tempfile::tempdir().unwrap();
        let body = "A,Yes,100,20,15,40,1200,10000,5000,500,500,80,12.5,30,9000,90\n\
B,No,,150,,10,5000,2000,3000,300,200,60,18.0,10,6000,40\n";
        let table = read_table(&write_csv(&dir, "colleges.csv", body)).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.records[0].acceptance_rate, 20.0);
        let b = &table.records[1];
        assert_eq!(b.applications, None);
        assert_eq!(b.accepted, Some(150));
        assert_eq!(b.enrolled, None);
        assert!(b.acceptance_rate.is_nan());
        assert_eq!(b.total_cost, 5500.0);
    }

    #[test]
    fn numeric_looking_names_keep_their_text() {
        let dir = tempfile::tempdir().unwrap();
        let row = ",Yes,100,20,15,40,1200,10000,5000,500,500,80,12.5,30,9000,90\n";
        let body: String = ["007", "7", "1.50"].iter().map(|n| format!("{n}{row}")).collect();
        let table = read_table(&write_csv(&dir, "colleges.csv", &body)).unwrap();
        let names: Vec<_> = table.records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["007", "7", "1.50"]);
    }

    #[test]
    fn missing_view_column_loads_as_nan() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no_expend.csv");
        std::fs::write(
            &path,
            ",Private,Apps,Accept,Grad.Rate,Outstate,Room.Board,Books,Personal,PhD\n\
A,Yes,100,20,90,10000,5000,500,500,80\n",
        )
        .unwrap();
        let table = read_table(&path).unwrap();

        assert_eq!(table.len(), 1);
        let r = &table.records[0];
        assert!(r.instructional_expenditure.is_nan());
        assert!(r.student_faculty_ratio.is_nan());
        assert_eq!(r.phd_faculty_pct, 80.0);
        assert_eq!(r.acceptance_rate, 20.0);
        assert_eq!(
            table.missing,
            [EXPEND_COLUMN, F_UNDERGRAD_COLUMN, TOP10_COLUMN, ALUMNI_COLUMN, SF_RATIO_COLUMN]
        );
    }

    #[test]
    fn parquet_integer_names_become_text() {
        let dir = tempfile::tempdir().unwrap();
        let mut fields = vec![
            Field::new("id", DataType::Int64, false),
            Field::new(PRIVATE_COLUMN, DataType::Utf8, false),
        ];
        let mut columns: Vec<Arc<dyn Array>> = vec![
            Arc::new(Int64Array::from(vec![7, 12])),
            Arc::new(StringArray::from(vec!["Yes", "No"])),
        ];
        for name in [
            APPS_COLUMN,
            ACCEPT_COLUMN,
            GRAD_RATE_COLUMN,
            OUTSTATE_COLUMN,
            ROOM_BOARD_COLUMN,
            BOOKS_COLUMN,
            PERSONAL_COLUMN,
        ] {
            fields.push(Field::new(name, DataType::Int64, false));
            columns.push(Arc::new(Int64Array::from(vec![10, 20])));
        }
        let schema = Arc::new(Schema::new(fields));
        let batch = RecordBatch::try_new(schema.clone(), columns).unwrap();
        let path = dir.path().join("ids.parquet");
        let mut writer = ArrowWriter::try_new(File::create(&path).unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let table = read_table(&path).unwrap();
        let names: Vec<_> = table.records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["7", "12"]);
        assert_eq!(table.missing.len(), VIEW_COLUMNS.len());
        assert_eq!(table.records[1].acceptance_rate, 100.0);
    }

    #[test]
    fn extra_columns_survive() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wide.csv");
        std::fs::write(
            &path,
            format!(
                "{HEADER},Terminal\n\
A,Yes,100,20,15,40,1200,10000,5000,500,500,80,12.5,30,9000,90,85\n"
            ),
        )
        .unwrap();
        let table = read_table(&path).unwrap();
        assert!(table.columns.iter().any(|c| c == "Terminal"));
        assert_eq!(
            table.records[0].extra.get("Terminal"),
            Some(&MetadataValue::Integer(85))
        );
    }

    #[test]
    fn missing_file_is_reported_as_missing_source() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_table(&dir.path().join("absent.csv")).unwrap_err();
        assert!(err.is_missing_source());
    }

    #[test]
    fn missing_required_column_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("narrow.csv");
        std::fs::write(&path, "name,Private,Apps\nA,Yes,10\n").unwrap();
        match read_table(&path) {
            Err(LoadError::MissingColumn { column }) => assert_eq!(column, ACCEPT_COLUMN),
            other => panic!("expected MissingColumn, got {other:?}"),
        }
    }

    #[test]
    fn text_in_numeric_column_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let body = "A,Yes,lots,20,15,40,1200,10000,5000,500,500,80,12.5,30,9000,90\n";
        match read_table(&write_csv(&dir, "colleges.csv", body)) {
            Err(LoadError::InvalidValue { row, column, value }) => {
                assert_eq!((row, column.as_str(), value.as_str()), (0, APPS_COLUMN, "lots"));
            }
            other => panic!("expected InvalidValue, got {other:?}"),
        }
    }

    #[test]
    fn parquet_matches_csv() {
        let dir = tempfile::tempdir().unwrap();
        let csv_table = read_table(&write_csv(&dir, "colleges.csv", TWO_ROWS)).unwrap();

        let headers: Vec<&str> = HEADER.split(',').collect();
        let mut fields = vec![
            Field::new("college", DataType::Utf8, false),
            Field::new(headers[1], DataType::Utf8, false),
        ];
        let mut columns: Vec<Arc<dyn Array>> = vec![
            Arc::new(StringArray::from(vec!["A", "B"])),
            Arc::new(StringArray::from(vec!["Yes", "No"])),
        ];
        for (i, name) in headers.iter().enumerate().skip(2) {
            let values: Vec<f64> = csv_table
                .records
                .iter()
                .map(|r| r.cell(name).as_f64().unwrap())
                .collect();
            if i <= 4 {
                fields.push(Field::new(*name, DataType::Int64, false));
                columns.push(Arc::new(Int64Array::from(
                    values.iter().map(|v| *v as i64).collect::<Vec<_>>(),
                )));
            } else {
                fields.push(Field::new(*name, DataType::Float64, false));
                columns.push(Arc::new(Float64Array::from(values)));
            }
        }
        let schema = Arc::new(Schema::new(fields));
        let batch = RecordBatch::try_new(schema.clone(), columns).unwrap();

        let path = dir.path().join("colleges.parquet");
        let mut writer = ArrowWriter::try_new(File::create(&path).unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let pq_table = read_table(&path).unwrap();
        assert_eq!(pq_table, csv_table);
    }
}
