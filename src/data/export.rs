use std::path::Path;

use super::filter::FilteredView;
use super::model::{
    Dataset, AGE, CHEST_PAIN, CHOLESTEROL, DATE_EXAM, MAX_HEART_RATE, SEX, TARGET,
};
use crate::error::ExportError;

/// Date format written on export, re-readable by the loader.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Render `view` as UTF-8 CSV: the dataset's source header, then one row per
/// record in view order.
pub fn to_csv_bytes(view: &FilteredView<'_>) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    write_rows(&mut writer, view)?;
    writer
        .into_inner()
        .map_err(|e| ExportError::Flush(std::io::Error::new(e.error().kind(), e.error().to_string())))
}

/// Write `view` as CSV to `path`.
pub fn write_csv(view: &FilteredView<'_>, path: &Path) -> Result<(), ExportError> {
    let file = std::fs::File::create(path).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut writer = csv::Writer::from_writer(file);
    write_rows(&mut writer, view)?;
    writer.flush().map_err(ExportError::Flush)?;
    log::info!("Exported {} records to {}", view.len(), path.display());
    Ok(())
}

fn write_rows<W: std::io::Write>(
    writer: &mut csv::Writer<W>,
    view: &FilteredView<'_>,
) -> Result<(), ExportError> {
    let dataset = view.dataset();
    let columns = dataset.columns();
    writer.write_record(columns)?;

    for &index in view.indices() {
        let row: Vec<String> = columns
            .iter()
            .map(|col| format_cell(dataset, index, col))
            .collect();
        writer.write_record(&row)?;
    }
    Ok(())
}

/// Text of `column` for record `index` of `dataset`, exactly as written on
/// export. Float cells reuse the loaded source text when there is one.
pub fn format_cell(dataset: &Dataset, index: usize, column: &str) -> String {
    let Some(rec) = dataset.records().get(index) else {
        return String::new();
    };
    let source = dataset.numeric_text(index);
    match column {
        AGE => rec.age.to_string(),
        SEX => rec.sex.code().to_string(),
        CHEST_PAIN => rec.cp.code().to_string(),
        CHOLESTEROL => source.map_or_else(|| rec.chol.to_string(), |t| t.chol.clone()),
        MAX_HEART_RATE => source.map_or_else(|| rec.thalach.to_string(), |t| t.thalach.clone()),
        TARGET => rec.target.code().to_string(),
        DATE_EXAM if dataset.is_temporal() => rec
            .date_exam
            .map(|d| d.format(DATE_FORMAT).to_string())
            .unwrap_or_default(),
        _ => dataset
            .extra_columns()
            .iter()
            .position(|c| c == column)
            .and_then(|i| rec.extra.get(i))
            .cloned()
            .unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{apply, Choice, FilterCriteria};
    use crate::data::loader::{read_csv, LoadOptions};
    use crate::data::model::{ChestPain, Disease, Record, Sex};

    const SOURCE: &str = "\
age,sex,cp,trestbps,chol,thalach,oldpeak,target,date_exam
63,1,3,145,233,150,2.3,1,2023-01-05
41,0,1,130,204.5,172,1.4,1,2023-02-11
57,0,0,120,354,163,0.6,0,2023-03-20
";

    #[test]
    fn export_keeps_source_columns_and_order() {
        let ds = read_csv(SOURCE.as_bytes(), &LoadOptions::default()).unwrap();
        let mut criteria = FilterCriteria::for_dataset(&ds);
        criteria.sex = Choice::Only(Sex::Female);

        let bytes = to_csv_bytes(&apply(&ds, &criteria)).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(
            text,
            "age,sex,cp,trestbps,chol,thalach,oldpeak,target,date_exam\n\
             41,0,1,130,204.5,172,1.4,1,2023-02-11\n\
             57,0,0,120,354,163,0.6,0,2023-03-20\n"
        );
    }

    #[test]
    fn float_cells_keep_source_precision() {
        let text = "age,sex,cp,chol,thalach,target\n63,1,3,233.0,150,1\n41,0,1,1.50,172.0,0\n";
        let ds = read_csv(text.as_bytes(), &LoadOptions::default()).unwrap();
        let out = String::from_utf8(to_csv_bytes(&apply(&ds, &FilterCriteria::for_dataset(&ds))).unwrap())
            .unwrap();
        assert_eq!(out, text);
    }

    #[test]
    fn synthetic_records_use_shortest_float_text() {
        let ds = Dataset::from_records(vec![Record::new(
            50,
            Sex::Male,
            ChestPain::TypicalAngina,
            233.0,
            150.5,
            Disease::Absent,
        )])
        .unwrap();
        let out = String::from_utf8(to_csv_bytes(&apply(&ds, &FilterCriteria::for_dataset(&ds))).unwrap())
            .unwrap();
        assert_eq!(out, "age,sex,cp,chol,thalach,target\n50,1,0,233,150.5,0\n");
    }

    #[test]
    fn empty_view_exports_header_only() {
        let ds = read_csv(SOURCE.as_bytes(), &LoadOptions::default()).unwrap();
        let mut criteria = FilterCriteria::for_dataset(&ds);
        criteria.age_range = crate::data::model::Span::new("age", 100, 120).unwrap();
        let text = String::from_utf8(to_csv_bytes(&apply(&ds, &criteria)).unwrap()).unwrap();
        assert_eq!(text.lines().count(), 1);
    }
}
