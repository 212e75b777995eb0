use std::collections::BTreeMap;

use anyhow::Result;
use chrono::NaiveDate;
use cds_curve_lib::{
    default_configs, input_to_assets, par_calibrate_credit_curves, plot_curves_svg, write_curves_csv, CdsInput,
    CdsPricer, LongShortNsParametrization, ParametrizedTermStructure,
};

/// Quotes priced off a known long-short curve, so the fit can be checked by eye.
fn synthetic_input(id: &str, short_rate: f64, long_rate: f64) -> Result<CdsInput> {
    let mut input = CdsInput {
        id: id.to_string(),
        upfront_payments: ["M6", "M12", "Y2", "Y3", "Y5", "Y7", "Y10"]
            .iter()
            .map(|tenor| (tenor.to_string(), 0.0))
            .collect(),
        interest_curve: [("M1", 0.030), ("M6", 0.032), ("Y1", 0.033), ("Y5", 0.035), ("Y10", 0.037), ("Y30", 0.038)]
            .iter()
            .map(|(tenor, rate)| (tenor.to_string(), *rate))
            .collect(),
        recovery_rate: 0.4,
        coupon_rate: 0.01,
        name: format!("{} Corp", id),
        date: NaiveDate::from_ymd_opt(2024, 9, 10).unwrap(),
        frequency: "3M".to_string(),
    };

    let curve = LongShortNsParametrization::default().evaluate(&[short_rate, long_rate])?;
    let pricer = CdsPricer::default();
    for cds in input_to_assets(&input, 0.25)? {
        let upfront = pricer.price_error(&cds, curve.as_ref()) * 100.0;
        input.upfront_payments.insert(cds.tenor.to_string(), upfront);
    }
    Ok(input)
}

fn main() -> Result<()> {
    println!("CDS hazard curve calibration demo\n");

    let issuers = [("ALPHA", 0.004, 0.015), ("BETA", 0.02, 0.03), ("GAMMA", 0.06, 0.035)];
    let inputs = issuers
        .iter()
        .map(|(id, short_rate, long_rate)| synthetic_input(id, *short_rate, *long_rate))
        .collect::<Result<Vec<_>>>()?;

    for input in &inputs {
        println!("{} upfronts (points):", input.id);
        for (tenor, upfront) in &input.upfront_payments {
            println!("   {:>4}: {:8.4}", tenor, upfront);
        }
    }

    let config = default_configs::standard();
    println!("\nCalibrating {} issuers...", inputs.len());
    let curves = par_calibrate_credit_curves(&inputs, &config)?;

    for (id, short_rate, long_rate) in &issuers {
        let Some(curve) = curves.get(*id) else {
            println!("\n{}: calibration failed", id);
            continue;
        };
        println!("\n{}:", id);
        println!("   True parameters:       [{:.5}, {:.5}]", short_rate, long_rate);
        println!("   Calibrated parameters: {:.5?}", curve.parameters);
        println!("   Objective:             {:.3e}", curve.objective);
        println!("   Max price error:       {:.3e}", curve.max_abs_pricing_error());
        println!("   Outer iterations:      {}", curve.iterations);
        for (tenor, hazard) in &curve.values {
            println!("   h({:>3}) = {:.4}%", tenor, hazard * 100.0);
        }
    }

    let mut csv = Vec::new();
    write_curves_csv(&mut csv, &curves, &config.report_tenors)?;
    println!("\nCSV report:\n{}", String::from_utf8_lossy(&csv));

    let chart = std::env::temp_dir().join("hazard_curves.svg");
    plot_curves_svg(&chart, &curves, 30.0)?;
    println!("Chart saved to {}", chart.display());

    let flat = par_calibrate_credit_curves(&inputs, &default_configs::flat())?;
    let flat_rates: BTreeMap<_, _> = flat.iter().map(|(id, c)| (id.as_str(), c.parameters[0])).collect();
    println!("\nFlat hazard rates for comparison: {:.5?}", flat_rates);

    Ok(())
}
