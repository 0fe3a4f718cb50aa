use chrono::NaiveDate;
use sales_forecast::ingest::{get_preprocessed, load_store_sales, load_superstore, DataSources};
use sales_forecast::synthetic::{generate_store_sales, write_store_sales_csv};
use sales_forecast::PipelineConfig;
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::{tempdir, NamedTempFile};

fn write_superstore(dir: &Path) {
    let path = DataSources::under(dir).superstore;
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(
        &path,
        "Row ID,Order Date,Ship Date,Product Name,Category,Sales\n\
         1,08/11/2017,11/11/2017,Bretford Table,Furniture,261.96\n\
         2,08/11/2017,11/11/2017,Bretford Table,Furniture,100.04\n\
         3,12/06/2017,16/06/2017,Avery Binder,Office Supplies,14.62\n\
         4,,16/06/2017,Avery Binder,Office Supplies,3.00\n\
         5,13/06/2017,16/06/2017,,Office Supplies,3.00\n",
    )
    .unwrap();
}

#[test]
fn test_superstore_dates_are_day_first() {
    let dir = tempdir().unwrap();
    write_superstore(dir.path());

    let rows = load_superstore(DataSources::under(dir.path()).superstore).unwrap();
    assert_eq!(rows.len(), 5);
    assert_eq!(rows[0].date, NaiveDate::from_ymd_opt(2017, 11, 8));
    assert_eq!(rows[2].category.as_deref(), Some("Office Supplies"));
    assert_eq!(rows[3].date, None);
}

#[test]
fn test_store_sales_family_is_product_and_category() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "id,date,store_nbr,family,sales,onpromotion").unwrap();
    writeln!(file, "0,2013-01-01,1,AUTOMOTIVE,0.0,0").unwrap();
    writeln!(file, "1,2013-01-01,2,AUTOMOTIVE,2.0,0").unwrap();
    writeln!(file, "2,2013-01-02,1,BEVERAGES,1091.0,0").unwrap();

    let rows = load_store_sales(file.path()).unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[2].product_name.as_deref(), Some("BEVERAGES"));
    assert_eq!(rows[2].category.as_deref(), Some("BEVERAGES"));
    assert_eq!(rows[2].date, NaiveDate::from_ymd_opt(2013, 1, 2));
}

#[test]
fn test_preprocessed_combines_sources() {
    let dir = tempdir().unwrap();
    write_superstore(dir.path());
    let start = NaiveDate::from_ymd_opt(2017, 1, 1).unwrap();
    let synthetic = generate_store_sales(2, 10, start, 5).unwrap();
    write_store_sales_csv(DataSources::under(dir.path()).store_sales, &synthetic).unwrap();

    let config = PipelineConfig::default().with_data_root(dir.path());
    let table = get_preprocessed(&config).unwrap();

    assert_eq!(
        table.products(),
        vec!["AUTOMOTIVE", "Avery Binder", "BEAUTY", "Bretford Table"]
    );
    // Two orders of the same product on the same day are summed
    let table_series = table.series_for("Bretford Table");
    assert_eq!(table_series.len(), 1);
    assert!((table_series.values()[0] - 362.0).abs() < 1e-9);
    assert_eq!(table.series_for("AUTOMOTIVE").len(), 10);
}

#[test]
fn test_missing_sources_give_empty_table() {
    let dir = tempdir().unwrap();
    let table = get_preprocessed(&PipelineConfig::default().with_data_root(dir.path())).unwrap();
    assert!(table.is_empty());
    assert!(table.products().is_empty());
}
