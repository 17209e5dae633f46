use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

fn gaussian(x: f64, mu: f64, sigma: f64, amplitude: f64) -> f64 {
    amplitude * (-(x - mu).powi(2) / (2.0 * sigma.powi(2))).exp()
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5)).rotate_left(7).wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// Ground truth written next to the generated spectra.
#[derive(Serialize)]
struct SpikeManifest {
    points: usize,
    spike_indices: Vec<usize>,
    spike_heights: Vec<f64>,
    files: Vec<String>,
}

fn write_table(path: &Path, header: Option<&str>, sep: &str, x: &[f64], y: &[f64]) -> Result<()> {
    let mut file = std::io::BufWriter::new(
        std::fs::File::create(path).with_context(|| format!("creating {}", path.display()))?,
    );
    if let Some(h) = header {
        writeln!(file, "{h}")?;
    }
    for (xi, yi) in x.iter().zip(y) {
        writeln!(file, "{xi:.2}{sep}{yi:.3}")?;
    }
    file.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let mut rng = SimpleRng::new(42);

    // C-H stretch region of an SFG spectrum: 2800 → 3100 cm⁻¹, step 0.5
    let wavenumbers: Vec<f64> = (0..601).map(|i| 2800.0 + i as f64 * 0.5).collect();
    let peaks = [(2878.0, 6.0, 800.0), (2940.0, 9.0, 450.0), (2965.0, 5.0, 600.0)];

    let mut intensity: Vec<f64> = wavenumbers
        .iter()
        .map(|&wn| {
            let signal: f64 = peaks
                .iter()
                .map(|&(mu, sigma, amp)| gaussian(wn, mu, sigma, amp))
                .sum();
            120.0 + signal + rng.gauss(0.0, 8.0)
        })
        .collect();

    // Cosmic-ray spikes: single-sample, upward only, at random positions.
    let mut spike_indices: Vec<usize> = (0..12)
        .map(|_| (rng.next_f64() * wavenumbers.len() as f64) as usize)
        .map(|i| i.min(wavenumbers.len() - 1))
        .collect();
    spike_indices.sort_unstable();
    spike_indices.dedup();
    let spike_heights: Vec<f64> = spike_indices
        .iter()
        .map(|&i| {
            let h = 1500.0 + rng.next_f64() * 6000.0;
            intensity[i] += h;
            h
        })
        .collect();

    let csv_path = Path::new("sample_spectrum.csv");
    let asc_path = Path::new("sample_spectrum.asc");
    write_table(csv_path, Some("wavenumber,intensity"), ",", &wavenumbers, &intensity)?;
    write_table(asc_path, None, "\t", &wavenumbers, &intensity)?;

    let manifest = SpikeManifest {
        points: wavenumbers.len(),
        spike_indices,
        spike_heights,
        files: vec![csv_path.display().to_string(), asc_path.display().to_string()],
    };
    let manifest_path = "sample_spikes.json";
    let json = serde_json::to_string_pretty(&manifest).context("serialising manifest")?;
    std::fs::write(manifest_path, json).with_context(|| format!("writing {manifest_path}"))?;

    log::info!("Injected spikes at {:?}", manifest.spike_indices);
    println!(
        "Wrote {} points with {} spikes to {} and {} ({manifest_path})",
        manifest.points,
        manifest.spike_indices.len(),
        csv_path.display(),
        asc_path.display()
    );
    Ok(())
}
