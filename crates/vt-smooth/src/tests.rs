//! Unit tests for vt-smooth.

#[cfg(test)]
mod kernel {
    use vt_core::SmoothingConfig;

    use crate::kernel_weight;

    #[test]
    fn zero_offset_has_unit_weight() {
        let cfg = SmoothingConfig::default();
        assert_eq!(kernel_weight(0.0, 0.0, cfg.c_free, &cfg), 1.0);
        assert_eq!(kernel_weight(0.0, 0.0, cfg.c_cong, &cfg), 1.0);
    }

    #[test]
    fn weight_peaks_along_characteristic() {
        let cfg = SmoothingConfig::default();
        let dx = 0.05;
        // On the congested characteristic the temporal term vanishes.
        let on_line = 3600.0 * dx / cfg.c_cong;
        let w_on = kernel_weight(on_line, dx, cfg.c_cong, &cfg);
        assert!((w_on - (-dx / cfg.x_window).exp()).abs() < 1e-12);
        // Same spatial offset, off the line: strictly lower weight.
        assert!(kernel_weight(on_line + 5.0, dx, cfg.c_cong, &cfg) < w_on);
        assert!(kernel_weight(on_line - 5.0, dx, cfg.c_cong, &cfg) < w_on);
    }

    #[test]
    fn regimes_skew_in_opposite_directions() {
        let cfg = SmoothingConfig::default();
        // Downstream point observed earlier: on a free-flow characteristic,
        // far from the congested one.
        let dx = -0.05;
        let dt = 3600.0 * dx / cfg.c_free;
        let free = kernel_weight(dt, dx, cfg.c_free, &cfg);
        let cong = kernel_weight(dt, dx, cfg.c_cong, &cfg);
        assert!(free > cong);
    }
}

#[cfg(test)]
mod filter {
    use vt_core::{FieldPoint, SmoothingConfig};

    use crate::{adaptive_smooth, in_window};

    #[test]
    fn no_candidates_falls_back_exactly() {
        let cfg = SmoothingConfig::default();
        let est = adaptive_smooth(100.0, 60.0, std::iter::empty(), &cfg);
        assert_eq!(est.free, 80.0);
        assert_eq!(est.congested, 80.0);
        assert_eq!(est.smoothed, 80.0);
    }

    #[test]
    fn undefined_candidates_are_ignored() {
        let cfg = SmoothingConfig::default();
        let est = adaptive_smooth(0.0, 0.0, [FieldPoint::new(0.0, 0.0, f64::NAN)], &cfg);
        assert_eq!(est.smoothed, 80.0);
    }

    #[test]
    fn single_candidate_returns_its_speed() {
        let cfg = SmoothingConfig::default();
        let est = adaptive_smooth(0.0, 0.0, [FieldPoint::new(0.0, 0.0, 60.0)], &cfg);
        assert_eq!(est.free, 60.0);
        assert_eq!(est.congested, 60.0);
        assert_eq!(est.smoothed, 60.0);

        // Off-centre the lone weight cancels out of each regime average.
        let est = adaptive_smooth(4.0, 0.01, [FieldPoint::new(0.0, 0.0, 60.0)], &cfg);
        assert!((est.free - 60.0).abs() < 1e-9);
        assert!((est.congested - 60.0).abs() < 1e-9);
        assert!((est.smoothed - 60.0).abs() < 1e-9);
    }

    #[test]
    fn blend_stays_between_regime_estimates() {
        let cfg = SmoothingConfig::default();
        let pts: Vec<FieldPoint> = (0..40)
            .map(|i| {
                let i = i as f64;
                FieldPoint::new(i * 0.9 - 18.0, (i * 0.37).sin() * 0.07, 10.0 + (i * 7.3) % 65.0)
            })
            .collect();
        for q in 0..25 {
            let q = q as f64;
            let (t, x) = (q * 1.3 - 15.0, q * 0.005 - 0.06);
            let cands = pts.iter().copied().filter(|p| in_window(t, x, p, &cfg));
            let est = adaptive_smooth(t, x, cands, &cfg);
            let lo = est.free.min(est.congested);
            let hi = est.free.max(est.congested);
            assert!(est.smoothed >= lo - 1e-9 && est.smoothed <= hi + 1e-9, "{est:?}");
            assert!((0.0..=1.0).contains(&est.transition_weight));
        }
    }

    #[test]
    fn low_speeds_favour_congested_estimate() {
        let cfg = SmoothingConfig::default();
        let est = crate::filter::blend(70.0, 15.0, &cfg);
        assert!(est.transition_weight > 0.99);
        assert!((est.smoothed - 15.0).abs() < 0.1);

        let est = crate::filter::blend(70.0, 65.0, &cfg);
        assert!(est.transition_weight < 0.01);
        assert!((est.smoothed - 70.0).abs() < 0.1);

        let est = crate::filter::blend(36.0, 50.0, &cfg);
        assert!((est.transition_weight - 0.5).abs() < 1e-12);
        assert!((est.smoothed - 43.0).abs() < 1e-9);
    }

    #[test]
    fn blend_is_weighted_mean_of_regimes() {
        let cfg = SmoothingConfig::default();
        for i in 0..30 {
            for j in 0..30 {
                let free = 5.0 + 2.5 * i as f64;
                let congested = 3.0 + 2.7 * j as f64;
                let est = crate::filter::blend(free, congested, &cfg);
                let w = est.transition_weight;
                let mean = w * congested + (1.0 - w) * free;
                assert!((est.smoothed - mean).abs() < 1e-12, "{free} {congested}: {est:?}");
            }
        }
        for v in [0.0, 12.5, 36.0, 80.0, 1e3] {
            assert_eq!(crate::filter::blend(v, v, &cfg).smoothed, v);
        }
    }

    #[test]
    fn window_is_inclusive() {
        let cfg = SmoothingConfig { x_window: 0.2, t_window: 40.0, ..SmoothingConfig::default() };
        assert!(in_window(0.0, 0.0, &FieldPoint::new(20.0, 0.1, 1.0), &cfg));
        assert!(in_window(0.0, 0.0, &FieldPoint::new(-20.0, -0.1, 1.0), &cfg));
        assert!(!in_window(0.0, 0.0, &FieldPoint::new(20.5, 0.0, 1.0), &cfg));
        assert!(!in_window(0.0, 0.0, &FieldPoint::new(0.0, 0.11, 1.0), &cfg));
    }
}

#[cfg(test)]
mod index {
    use vt_core::{FieldPoint, SmoothingConfig};

    use crate::{FieldIndex, adaptive_smooth, in_window};

    fn lattice() -> Vec<FieldPoint> {
        let mut pts = Vec::new();
        for ti in 0..50 {
            for xi in 0..40 {
                let speed = 20.0 + ((ti * 7 + xi * 3) % 50) as f64;
                pts.push(FieldPoint::new(ti as f64 * 4.0, 58.7 + xi as f64 * 0.02, speed));
            }
        }
        pts
    }

    #[test]
    fn within_matches_linear_scan() {
        let pts = lattice();
        let index = FieldIndex::new(pts.iter().copied());
        assert_eq!(index.len(), pts.len());
        let cfg = SmoothingConfig::default();

        for &(t, x) in &[(0.0, 58.7), (100.0, 59.1), (196.0, 59.48), (18.0, 58.775), (50.3, 58.9)] {
            let mut from_index: Vec<_> = index
                .within(t, x, cfg.t_window / 2.0, cfg.x_window / 2.0)
                .map(|p| (p.t.to_bits(), p.x.to_bits()))
                .collect();
            let mut from_scan: Vec<_> = pts
                .iter()
                .filter(|p| in_window(t, x, p, &cfg))
                .map(|p| (p.t.to_bits(), p.x.to_bits()))
                .collect();
            from_index.sort_unstable();
            from_scan.sort_unstable();
            assert_eq!(from_index, from_scan, "query ({t}, {x})");
        }
    }

    #[test]
    fn indexed_smoothing_matches_linear_scan() {
        let pts = lattice();
        let index = FieldIndex::new(pts.iter().copied());
        let cfg = SmoothingConfig::default();
        let (t, x) = (120.0, 59.2);

        let a = adaptive_smooth(t, x, index.within(t, x, 18.0, 0.075), &cfg);
        let b = adaptive_smooth(t, x, pts.iter().copied().filter(|p| in_window(t, x, p, &cfg)), &cfg);
        assert!((a.smoothed - b.smoothed).abs() < 1e-9);
    }

    #[test]
    fn non_finite_coordinates_skipped() {
        let index = FieldIndex::new([
            FieldPoint::new(f64::NAN, 1.0, 50.0),
            FieldPoint::new(0.0, 1.0, 50.0),
        ]);
        assert_eq!(index.len(), 1);
        assert!(!index.is_empty());
    }
}

#[cfg(test)]
mod builder {
    use vt_core::{GridConfig, RawSpeedField, SmoothingConfig};

    use crate::{FieldBuilder, smooth_raw_field};

    fn grid() -> GridConfig {
        // 10 time bins × 200 space bins.
        GridConfig::new(0.02, 4.0, 0.0, 40.0)
    }

    #[test]
    fn single_defined_bin_scenario() {
        let g = grid();
        let mut raw = RawSpeedField::undefined(g.n_time_bins(), g.n_space_bins());
        raw.set(0, 0, 60.0).unwrap();

        let smoothed = smooth_raw_field(&raw, &g, &SmoothingConfig::default()).unwrap();
        assert_eq!(smoothed.len(), raw.len());

        let first = smoothed.rows[0];
        assert_eq!((first.t_index, first.x_index), (0, 0));
        assert_eq!(first.raw_speed, 60.0);
        assert_eq!(first.time, 0.0);
        assert!((first.milemarker - 58.7).abs() < 1e-12);
        assert_eq!(first.speed, 60.0);

        // Neighbour inside the window also sees only the one bin.
        let near = smoothed.rows.iter().find(|r| r.t_index == 1 && r.x_index == 1).unwrap();
        assert!(near.raw_speed.is_nan());
        assert!((near.speed - 60.0).abs() < 1e-9);

        // Far away: no candidates, fallback speed.
        let far = smoothed.rows.iter().find(|r| r.t_index == 9 && r.x_index == 150).unwrap();
        assert_eq!(far.speed, 80.0);
    }

    #[test]
    fn rows_follow_raw_order_and_coordinates() {
        let g = grid();
        let raw = RawSpeedField::new(
            g.n_time_bins(),
            g.n_space_bins(),
            vec![55.0; g.n_time_bins() * g.n_space_bins()],
        )
        .unwrap();
        let smoothed = FieldBuilder::new(SmoothingConfig::default()).unwrap().build(&raw, &g);

        for (row, (ti, xi, v)) in smoothed.iter().zip(raw.cells()) {
            assert_eq!((row.t_index, row.x_index, row.raw_speed), (ti, xi, v));
            assert_eq!(row.time, g.cell_time(ti));
            assert_eq!(row.milemarker, g.cell_milemarker(xi));
            assert!((row.speed - 55.0).abs() < 1e-9);
        }
    }

    #[test]
    fn invalid_config_rejected() {
        let cfg = SmoothingConfig { t_window: 0.0, ..SmoothingConfig::default() };
        assert!(FieldBuilder::new(cfg).is_err());
    }
}
