use proptest::prelude::*;
use savgol_filter::{BoundaryMode, ErrorKind, FilterConfig, SavitzkyGolayFilter};

fn boundary_mode() -> impl Strategy<Value = BoundaryMode> {
    prop::sample::select(BoundaryMode::ALL.to_vec())
}

/// Valid configuration together with a sample sequence at least one window long.
fn config_and_data() -> impl Strategy<Value = (FilterConfig, Vec<f64>)> {
    (1usize..=5, boundary_mode())
        .prop_flat_map(|(n, mode)| {
            let window = 2 * n + 1;
            (
                Just(n),
                0..=window.min(5) - 1,
                0..=2 * n,
                0usize..=2,
                Just(mode),
                prop::collection::vec(-100.0f64..100.0, window..window + 30),
            )
        })
        .prop_map(|(n, m, t, d, mode, data)| {
            let config = FilterConfig::new(n, m)
                .with_target_point(t)
                .with_derivative(d)
                .with_boundary_mode(mode);
            (config, data)
        })
}

proptest! {
    #[test]
    fn create_fails_exactly_on_invalid_ranges(n in 0usize..6, m in 0usize..14, t in 0usize..14) {
        let config = FilterConfig::new(n, m).with_target_point(t);
        let invalid = n < 1 || m >= 2 * n + 1 || t > 2 * n;

        match SavitzkyGolayFilter::new(config) {
            Ok(_) => prop_assert!(!invalid),
            Err(err) => {
                prop_assert!(invalid);
                prop_assert_eq!(err.kind(), ErrorKind::Config);
            }
        }
    }

    #[test]
    fn output_lengths((config, data) in config_and_data()) {
        let n = config.half_window;
        let filter = SavitzkyGolayFilter::new(config).unwrap();

        prop_assert_eq!(filter.apply(&data).unwrap().len(), data.len());
        prop_assert_eq!(filter.apply_valid(&data).unwrap().len(), data.len() - 2 * n);
    }

    #[test]
    fn interior_agrees_bit_for_bit((config, data) in config_and_data()) {
        let n = config.half_window;
        let filter = SavitzkyGolayFilter::new(config).unwrap();

        let full = filter.apply(&data).unwrap();
        let valid = filter.apply_valid(&data).unwrap();
        for (j, value) in valid.iter().enumerate() {
            prop_assert_eq!(full[j + n].to_bits(), value.to_bits());
        }
    }

    #[test]
    fn smoothing_preserves_linear_data(
        n in 1usize..=5,
        m in 1usize..=4,
        mode in boundary_mode(),
        a in -50.0f64..50.0,
        b in -5.0f64..5.0,
        extra in 0usize..20,
    ) {
        let m = m.min(2 * n);
        let len = 2 * n + 1 + extra;
        let data: Vec<f64> = (0..len).map(|i| a + b * i as f64).collect();

        let config = FilterConfig::new(n, m).with_boundary_mode(mode);
        let filter = SavitzkyGolayFilter::new(config).unwrap();
        let output = filter.apply(&data).unwrap();

        for i in n..len - n {
            prop_assert!((output[i] - data[i]).abs() < 1e-6, "index {}: {} vs {}", i, output[i], data[i]);
        }
        if mode == BoundaryMode::Polynomial {
            for i in (0..n).chain(len - n..len) {
                prop_assert!((output[i] - data[i]).abs() < 1e-6, "edge {}: {} vs {}", i, output[i], data[i]);
            }
        }
    }

    #[test]
    fn periodic_matches_doubled_sequence(
        n in 1usize..=4,
        data in prop::collection::vec(-10.0f64..10.0, 9..30),
    ) {
        prop_assume!(data.len() >= 2 * n + 1);
        let config = FilterConfig::new(n, 2).with_boundary_mode(BoundaryMode::Periodic);
        let filter = SavitzkyGolayFilter::new(config).unwrap();

        let doubled: Vec<f64> = data.iter().chain(data.iter()).copied().collect();
        let single = filter.apply(&data).unwrap();
        let double = filter.apply(&doubled).unwrap();

        for i in 0..data.len() {
            prop_assert_eq!(single[i].to_bits(), double[data.len() + i].to_bits());
        }
    }
}
