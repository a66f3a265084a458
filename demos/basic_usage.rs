//! Example usage of the Savitzky-Golay filter crate

use savgol_filter::{calc, BoundaryMode, FilterConfig, SavitzkyGolayFilter, VERSION};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== {} examples ===\n", VERSION);

    // Create some noisy test data
    let step = 0.1;
    let clean_signal: Vec<f64> = (0..20)
        .map(|i| {
            let x = i as f64 * step;
            (2.0 * std::f64::consts::PI * x).sin() + 0.5 * (4.0 * std::f64::consts::PI * x).cos()
        })
        .collect();

    let noisy_signal: Vec<f64> = clean_signal
        .iter()
        .enumerate()
        .map(|(i, v)| if i % 3 == 0 { v + 0.3 * (i as f64 % 2.0 - 0.5) } else { *v })
        .collect();

    println!("Original noisy signal:");
    print_signal(&noisy_signal);

    // Example 1: One-shot smoothing
    println!("\n1. One-shot smoothing (half_window=2, poly_order=2):");
    match calc(2, 2, 2, 0, &noisy_signal) {
        (Some(smoothed), _) => print_signal(&smoothed),
        (None, message) => println!("calc failed: {}", message.unwrap_or_default()),
    }

    // Example 2: Every boundary mode
    for mode in BoundaryMode::ALL {
        println!("\n2. {:?} boundary mode (half_window=3, poly_order=3):", mode);
        let filter = SavitzkyGolayFilter::new(FilterConfig::new(3, 3).with_boundary_mode(mode))?;
        print_signal(&filter.apply(&noisy_signal)?);
    }

    // Example 3: Interior samples only
    println!("\n3. Interior samples only:");
    let filter = SavitzkyGolayFilter::new(FilterConfig::new(3, 3))?;
    print_signal(&filter.apply_valid(&noisy_signal)?);

    // Example 4: First derivative in physical units
    println!("\n4. First derivative:");
    let filter = SavitzkyGolayFilter::new(
        FilterConfig::new(3, 2).with_derivative(1).with_time_step(step),
    )?;
    print_signal(&filter.apply(&clean_signal)?);

    // Example 5: Second derivative
    println!("\n5. Second derivative:");
    let mut filter = SavitzkyGolayFilter::new(
        FilterConfig::new(3, 3).with_derivative(2).with_time_step(step),
    )?;
    print_signal(&filter.apply(&clean_signal)?);

    // Example 6: Lifecycle
    filter.dispose();
    if let Err(err) = filter.apply(&clean_signal) {
        println!("\n6. After dispose: {}", err);
    }

    // Example 7: Performance with a large dataset
    println!("\n7. Performance test with large dataset:");
    let large_data: Vec<f64> = (0..100_000)
        .map(|i| (i as f64 * 0.001).sin() + 0.1 * (i as f64 * 0.01).cos())
        .collect();

    let start = std::time::Instant::now();
    let filter = SavitzkyGolayFilter::new(FilterConfig::new(5, 3))?;
    let _smoothed_large = filter.apply(&large_data)?;
    println!("Processed {} points in {:?}", large_data.len(), start.elapsed());

    Ok(())
}

fn print_signal(signal: &[f64]) {
    for (i, &value) in signal.iter().enumerate() {
        print!("{:8.3}", value);
        if (i + 1) % 8 == 0 {
            println!();
        }
    }
    if signal.len() % 8 != 0 {
        println!();
    }
}
