#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use csv_slim::{Column, ColumnData, frame::Frame};
use tempfile::{TempDir, tempdir};

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }
}

pub fn text(values: &[&str]) -> ColumnData {
    ColumnData::Text(values.iter().map(|v| Some(v.to_string())).collect())
}

/// Seven columns covering every reduction path:
/// `a` small positive ints, `b` reals that round cleanly, `c` reals with a
/// missing value, `d`/`e` low-cardinality text, `f` date strings and `g`
/// two-valued negative ints.
pub fn reference_frame() -> Frame {
    let dates = (27..=29)
        .map(|day| format!("2016-02-{day}"))
        .chain((1..=4).map(|day| format!("2016-03-0{day}")))
        .collect::<Vec<_>>();
    Frame::from_columns(vec![
        Column::new("a", ColumnData::Int64((1..8).collect())),
        Column::new(
            "b",
            ColumnData::Float64(vec![1.1, 1.2, 3.0, 4.0, 5.0, 6.0, 7.0]),
        ),
        Column::new(
            "c",
            ColumnData::Float64(vec![1.0, f64::NAN, 3.0, 4.0, 5.0, 6.0, 7.0]),
        ),
        Column::new("d", text(&["x", "y", "x", "x", "x", "x", "x"])),
        Column::new("e", text(&["x", "y", "z", "z", "z", "z", "z"])),
        Column::new(
            "f",
            ColumnData::Text(dates.into_iter().map(Some).collect()),
        ),
        Column::new("g", ColumnData::Int64(vec![-1, -1, -2, -2, -1, -2, -1])),
    ])
    .expect("reference frame")
}

pub const REFERENCE_CSV: &str = "\
a,b,c,d,e,f,g
1,1.1,1,x,x,2016-02-27,-1
2,1.2,,y,y,2016-02-28,-1
3,3,3,x,z,2016-02-29,-2
4,4,4,x,z,2016-03-01,-2
5,5,5,x,z,2016-03-02,-1
6,6,6,x,z,2016-03-03,-2
7,7,7,x,z,2016-03-04,-1
";
