mod common;

use common::{REFERENCE_CSV, TestWorkspace};
use csv_slim::{
    DType,
    load::{LoadOptions, read_frame},
    reduce::{ReduceOptions, reduce},
};

#[test]
fn reference_csv_loads_with_wide_types() {
    let workspace = TestWorkspace::new();
    let path = workspace.write("reference.csv", REFERENCE_CSV);
    let frame = read_frame(&path, &LoadOptions::default()).expect("load csv");

    assert_eq!(frame.names(), vec!["a", "b", "c", "d", "e", "f", "g"]);
    assert_eq!(frame.row_count(), Some(7));
    assert_eq!(
        frame.dtypes(),
        vec![
            DType::Int64,
            DType::Float64,
            DType::Float64,
            DType::Text,
            DType::Text,
            DType::Text,
            DType::Int64,
        ]
    );
}

#[test]
fn loaded_csv_reduces_like_in_memory_frame() {
    let workspace = TestWorkspace::new();
    let path = workspace.write("reference.csv", REFERENCE_CSV);
    let mut frame = read_frame(&path, &LoadOptions::default()).unwrap();
    reduce(&mut frame, &ReduceOptions::default()).unwrap();
    assert_eq!(
        frame.dtypes(),
        vec![
            DType::UInt8,
            DType::Float16,
            DType::Float16,
            DType::Category,
            DType::Category,
            DType::DateTime,
            DType::Int8,
        ]
    );
}

#[test]
fn tsv_extension_switches_delimiter() {
    let workspace = TestWorkspace::new();
    let path = workspace.write("values.tsv", "id\tscore\n1\t0.5\n2\t1.5\n");
    let frame = read_frame(&path, &LoadOptions::default()).unwrap();
    assert_eq!(frame.dtypes(), vec![DType::Int64, DType::Float64]);
}

#[test]
fn missing_file_reports_path() {
    let workspace = TestWorkspace::new();
    let err = read_frame(&workspace.path().join("absent.csv"), &LoadOptions::default())
        .unwrap_err();
    assert!(format!("{err:#}").contains("absent.csv"));
}
