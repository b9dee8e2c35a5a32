//! Writer tests for vt-output.

#[cfg(test)]
mod fixtures {
    use vt_core::{RawSpeedField, SmoothedRow, SmoothedSpeedField, VehicleId, VirtualTrajectory};

    /// 2×2 raw field with one undefined cell at (1, 0).
    pub fn raw() -> RawSpeedField {
        RawSpeedField::new(2, 2, vec![60.0, 45.5, f64::NAN, 30.0]).unwrap()
    }

    pub fn smoothed() -> SmoothedSpeedField {
        SmoothedSpeedField::new(vec![
            SmoothedRow { t_index: 0, x_index: 0, raw_speed: 60.0, time: 0.0, milemarker: 58.7, speed: 59.25 },
            SmoothedRow { t_index: 0, x_index: 1, raw_speed: f64::NAN, time: 0.0, milemarker: 58.72, speed: 57.0 },
        ])
    }

    pub fn trajectory(id: u32) -> VirtualTrajectory {
        let mut traj = VirtualTrajectory::new(VehicleId(id));
        traj.push(0.0, 0.32, 50.0);
        traj.push(0.1, 0.32 + 0.1 * 50.0 / 3600.0, 50.0);
        traj
    }
}

#[cfg(test)]
mod csv_tests {
    use tempfile::TempDir;

    use super::fixtures;
    use crate::csv::CsvWriter;
    use crate::writer::OutputWriter;

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    fn read(dir: &TempDir, file: &str) -> (Vec<String>, Vec<csv::StringRecord>) {
        let mut rdr = csv::Reader::from_path(dir.path().join(file)).unwrap();
        let headers = rdr.headers().unwrap().iter().map(str::to_owned).collect();
        let rows = rdr.records().map(|r| r.unwrap()).collect();
        (headers, rows)
    }

    #[test]
    fn csv_files_created() {
        let dir = tmp();
        let _w = CsvWriter::new(dir.path()).unwrap();
        assert!(dir.path().join("raw_field.csv").exists());
        assert!(dir.path().join("smoothed_field.csv").exists());
        assert!(dir.path().join("trajectories.csv").exists());
    }

    #[test]
    fn csv_headers_correct() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();

        assert_eq!(read(&dir, "raw_field.csv").0, ["t_index", "x_index", "speed"]);
        assert_eq!(
            read(&dir, "smoothed_field.csv").0,
            ["t_index", "x_index", "raw_speed", "time", "milemarker", "speed"]
        );
        assert_eq!(read(&dir, "trajectories.csv").0, ["time", "space", "speed", "v_id"]);
    }

    #[test]
    fn raw_field_undefined_cell_is_empty() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_raw_field(&fixtures::raw()).unwrap();
        w.finish().unwrap();

        let (_, rows) = read(&dir, "raw_field.csv");
        assert_eq!(rows.len(), 4);
        assert_eq!((&rows[0][0], &rows[0][1], &rows[0][2]), ("0", "0", "60"));
        assert_eq!(&rows[1][2], "45.5");
        assert_eq!((&rows[2][0], &rows[2][1], &rows[2][2]), ("1", "0", ""));
    }

    #[test]
    fn smoothed_field_rows() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_smoothed_field(&fixtures::smoothed()).unwrap();
        w.finish().unwrap();

        let (_, rows) = read(&dir, "smoothed_field.csv");
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][4], "58.7");
        assert_eq!(&rows[0][5], "59.25");
        assert_eq!(&rows[1][2], "");
        assert_eq!(&rows[1][5], "57");
    }

    #[test]
    fn trajectories_append_with_vehicle_id() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_trajectory(&fixtures::trajectory(1)).unwrap();
        w.write_trajectory(&fixtures::trajectory(2)).unwrap();
        w.finish().unwrap();

        let (_, rows) = read(&dir, "trajectories.csv");
        assert_eq!(rows.len(), 4);
        let ids: Vec<&str> = rows.iter().map(|r| &r[3]).collect();
        assert_eq!(ids, ["1", "1", "2", "2"]);
        assert_eq!(&rows[0][1], "0.32");
        assert_eq!(rows[1][0].parse::<f64>().unwrap(), 0.1);
    }

    #[test]
    fn csv_finish_idempotent() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();
        w.finish().unwrap();
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = tmp();
        assert!(CsvWriter::new(&dir.path().join("absent")).is_err());
    }
}

#[cfg(all(test, feature = "sqlite"))]
mod sqlite_tests {
    use tempfile::TempDir;

    use super::fixtures;
    use crate::sqlite::SqliteWriter;
    use crate::writer::OutputWriter;

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    fn open(dir: &TempDir) -> rusqlite::Connection {
        rusqlite::Connection::open(dir.path().join("output.db")).unwrap()
    }

    #[test]
    fn sqlite_db_created() {
        let dir = tmp();
        let _w = SqliteWriter::new(dir.path()).unwrap();
        assert!(dir.path().join("output.db").exists());
    }

    #[test]
    fn raw_field_nan_stored_as_null() {
        let dir = tmp();
        let mut w = SqliteWriter::new(dir.path()).unwrap();
        w.write_raw_field(&fixtures::raw()).unwrap();
        w.finish().unwrap();

        let conn = open(&dir);
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM raw_field", [], |r| r.get(0)).unwrap();
        assert_eq!(count, 4);
        let nulls: i64 = conn
            .query_row("SELECT COUNT(*) FROM raw_field WHERE speed IS NULL", [], |r| r.get(0))
            .unwrap();
        assert_eq!(nulls, 1);
        let v: Option<f64> = conn
            .query_row("SELECT speed FROM raw_field WHERE t_index = 1 AND x_index = 0", [], |r| r.get(0))
            .unwrap();
        assert_eq!(v, None);
    }

    #[test]
    fn smoothed_field_rows() {
        let dir = tmp();
        let mut w = SqliteWriter::new(dir.path()).unwrap();
        w.write_smoothed_field(&fixtures::smoothed()).unwrap();
        w.finish().unwrap();

        let conn = open(&dir);
        let (mm, speed): (f64, f64) = conn
            .query_row(
                "SELECT milemarker, speed FROM smoothed_field WHERE x_index = 1",
                [],
                |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .unwrap();
        assert_eq!((mm, speed), (58.72, 57.0));
    }

    #[test]
    fn trajectories_grouped_by_vehicle() {
        let dir = tmp();
        let mut w = SqliteWriter::new(dir.path()).unwrap();
        w.write_trajectory(&fixtures::trajectory(3)).unwrap();
        w.write_trajectory(&fixtures::trajectory(4)).unwrap();
        w.finish().unwrap();

        let conn = open(&dir);
        let n: i64 = conn
            .query_row("SELECT COUNT(*) FROM trajectories WHERE v_id = 4", [], |r| r.get(0))
            .unwrap();
        assert_eq!(n, 2);
    }

    #[test]
    fn sqlite_finish_idempotent() {
        let dir = tmp();
        let mut w = SqliteWriter::new(dir.path()).unwrap();
        w.finish().unwrap();
        w.finish().unwrap();
    }
}
