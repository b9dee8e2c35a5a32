//! Tests for the corridor driver.

#[cfg(test)]
mod scenario {
    use vt_aggregate::load_records_reader;

    use crate::synthetic::Scenario;

    #[test]
    fn wave_slows_traffic_only_near_its_centre() {
        let s = Scenario::default();
        let centre = s.wave_origin;
        assert!((s.speed(centre, 0.0, 60.0) - 60.0 * (1.0 - s.wave_depth)).abs() < 1e-12);
        assert!((s.speed(0.0, 0.0, 60.0) - 60.0).abs() < 1e-6);

        // One minute later the slowest point has moved upstream.
        let later = centre - s.wave_speed * 60.0 / 3_600.0;
        assert!(s.speed(later, 60.0, 60.0) < s.speed(centre, 60.0, 60.0));
    }

    #[test]
    fn generated_records_decode_and_travel_downstream() {
        let s = Scenario { duration: 120.0, warmup: 60.0, sample_period: 1.0, ..Scenario::default() };
        let grid = s.grid(0.02, 4.0);
        let json = serde_json::to_vec(&s.generate(7, &grid)).unwrap();
        let records = load_records_reader(json.as_slice()).unwrap();

        assert!(!records.is_empty());
        for r in &records {
            assert_eq!(r.direction, -1);
            assert!(r.length > 0.0);
            assert_eq!(r.sample_count(), Some(r.timestamp.len()));
            assert!(r.x_position.windows(2).all(|w| w[1] <= w[0]));
            assert!(r.first_timestamp <= r.last_timestamp);
        }
    }

    #[test]
    fn generation_is_seeded() {
        let s = Scenario { duration: 60.0, warmup: 0.0, ..Scenario::default() };
        let grid = s.grid(0.02, 4.0);
        assert_eq!(s.generate(3, &grid), s.generate(3, &grid));
        assert_ne!(s.generate(3, &grid), s.generate(4, &grid));
    }
}

#[cfg(test)]
mod pipeline_tests {
    use vt_core::{GridConfig, LaneBand, PipelineConfig, VehicleId};
    use vt_output::CsvWriter;

    use crate::pipeline;
    use crate::synthetic::Scenario;

    #[test]
    fn seeds_count_vehicles_from_one() {
        let seeds = pipeline::seeds(&[0.0, 30.0], None, false);
        assert_eq!(seeds.len(), 2);
        assert_eq!(seeds[1].vehicle, VehicleId(2));
        assert!(seeds.iter().all(|s| s.reflected && s.x0.is_none()));

        let forward = pipeline::seeds(&[5.0], Some(59.0), true);
        assert!(!forward[0].reflected);
        assert_eq!(forward[0].x0, Some(59.0));
    }

    #[test]
    fn config_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pipeline.json");
        let cfg = PipelineConfig::new(GridConfig::new(0.05, 5.0, 100.0, 700.0), LaneBand::Lane3);
        std::fs::write(&path, serde_json::to_string(&cfg).unwrap()).unwrap();
        assert_eq!(pipeline::load_config(&path).unwrap(), cfg);
    }

    #[test]
    fn synthetic_corridor_end_to_end() {
        let s = Scenario {
            duration:      600.0,
            warmup:        240.0,
            sample_period: 1.0,
            headway:       (8.0, 12.0),
            ..Scenario::default()
        };
        let cfg = PipelineConfig::new(s.grid(0.02, 4.0), LaneBand::Lane2);
        let generated = s.generate(11, &cfg.grid);
        let json = serde_json::to_vec(&generated).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let mut writer = CsvWriter::new(dir.path()).unwrap();
        let seeds = pipeline::seeds(&[0.0], None, false);
        let summary = pipeline::run(&cfg, json.as_slice(), &seeds, &mut writer).unwrap();

        assert_eq!(summary.records, generated.len() as u64);
        assert_eq!(summary.malformed, 0);
        assert_eq!(summary.cells, 150 * 200);
        assert!(summary.defined_cells > 0);
        assert_eq!(summary.trajectories, 1);
        assert_eq!(summary.failed_seeds, 0);

        let mut rdr = csv::Reader::from_path(dir.path().join("trajectories.csv")).unwrap();
        let spaces: Vec<f64> = rdr.records().map(|r| r.unwrap()[1].parse().unwrap()).collect();
        assert_eq!(spaces.len(), summary.samples);
        assert!((spaces[0] - 62.68).abs() < 1e-9);
        assert!(spaces.windows(2).all(|w| w[1] < w[0]));
    }
}
