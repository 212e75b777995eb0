// src/report.rs

//! Output of calibrated curves: CSV tables and SVG charts.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use log::info;
use plotters::prelude::*;

use crate::calibration::types::CalibratedCurve;
use crate::models::TermStructure;

/// Writes one row per issuer: `id`, then the curve value at each of `tenors`.
///
/// Tenors missing from a curve are left empty.
pub fn write_curves_csv<W: Write>(
    writer: W,
    curves: &BTreeMap<String, CalibratedCurve>,
    tenors: &[String],
) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    let mut header = vec!["id".to_string()];
    header.extend(tenors.iter().cloned());
    csv_writer.write_record(&header).context("error while writing header")?;

    for (issuer, curve) in curves {
        let mut record = vec![issuer.clone()];
        record.extend(
            tenors
                .iter()
                .map(|tenor| curve.values.get(tenor).map(|v| format!("{:.6}", v)).unwrap_or_default()),
        );
        csv_writer
            .write_record(&record)
            .with_context(|| format!("error while writing results for {}", issuer))?;
    }

    csv_writer.flush()?;
    Ok(())
}

pub fn write_curves_csv_file<P: AsRef<Path>>(
    path: P,
    curves: &BTreeMap<String, CalibratedCurve>,
    tenors: &[String],
) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).with_context(|| format!("error while creating report file {}", path.display()))?;
    write_curves_csv(file, curves, tenors)?;
    info!("wrote {} curves to {}", curves.len(), path.display());
    Ok(())
}

/// Plots hazard rate against maturity, one line per issuer, up to `max_years`.
pub fn plot_curves_svg<P: AsRef<Path>>(
    path: P,
    curves: &BTreeMap<String, CalibratedCurve>,
    max_years: f64,
) -> Result<()> {
    if curves.is_empty() {
        return Err(anyhow!("no curve to plot"));
    }
    if !(max_years > 0.0) {
        return Err(anyhow!("max_years must be positive, got {}", max_years));
    }

    let steps = 250;
    let mut lines = Vec::with_capacity(curves.len());
    for (issuer, curve) in curves {
        let ts = curve.term_structure()?;
        let points: Vec<(f64, f64)> = (0..=steps)
            .map(|i| {
                let t = max_years * i as f64 / steps as f64;
                (t, ts.value(t) * 1.0e4)
            })
            .collect();
        lines.push((issuer.as_str(), points));
    }

    let (y_low, y_high) = lines
        .iter()
        .flat_map(|(_, points)| points.iter().map(|p| p.1))
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), y| (lo.min(y), hi.max(y)));
    let padding = ((y_high - y_low) * 0.1).max(1.0);

    let draw_error = |e: &dyn std::fmt::Display| anyhow!("could not draw hazard curves: {}", e);

    let root = SVGBackend::new(path.as_ref(), (1280, 768)).into_drawing_area();
    root.fill(&WHITE).map_err(|e| draw_error(&e))?;

    let mut chart = ChartBuilder::on(&root)
        .margin(20)
        .caption("Calibrated hazard curves", ("sans-serif", 30))
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0.0..max_years, (y_low - padding)..(y_high + padding))
        .map_err(|e| draw_error(&e))?;

    chart
        .configure_mesh()
        .x_desc("Maturity (years)")
        .y_desc("Hazard rate (bp)")
        .draw()
        .map_err(|e| draw_error(&e))?;

    for (i, (issuer, points)) in lines.into_iter().enumerate() {
        let color = Palette99::pick(i).to_rgba();
        chart
            .draw_series(LineSeries::new(points, color.stroke_width(2)))
            .map_err(|e| draw_error(&e))?
            .label(issuer)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(|e| draw_error(&e))?;

    root.present().map_err(|e| draw_error(&e))?;
    info!("hazard curve chart saved to {}", path.as_ref().display());
    Ok(())
}
