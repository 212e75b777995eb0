
use std::collections::BTreeMap;

use approx::assert_abs_diff_eq;
use cds_curve_lib::{
    calibrate_credit_curve, calibrate_credit_curves, input_to_assets, load_cds_inputs, par_calibrate_credit_curves,
    write_curves_csv, CdsPricer, ExtractionConfig, FlatParametrization, InitialGuess, LongShortNsParametrization,
    Parametrization, ParametrizedTermStructure, TermStructure,
};
use test_utils::{create_flat_config, create_input, create_test_config, with_fair_upfronts};

/// Upfronts priced off a flat 2% hazard rate must be repriced by a flat 2% curve.
#[test]
fn test_flat_hazard_recovered() {
    let input = with_fair_upfronts(create_input("FLAT", &["Y5"]), &FlatParametrization, &[0.02]);
    println!("Y5 fair upfront: {:.6} points", input.upfront_payments["Y5"]);

    let curve = calibrate_credit_curve(&input, &create_flat_config())
        .expect("calibration should succeed")
        .expect("one quote should be usable");

    println!("Calibrated flat hazard: {:.6}", curve.parameters[0]);
    assert_eq!(curve.parameters.len(), 1);
    assert_abs_diff_eq!(curve.parameters[0], 0.02, epsilon = 1e-3);
    assert!(curve.pricing_errors["Y5"].abs() < 1e-4);
    assert_eq!(curve.iterations, 1);

    // A flat curve reports the same value everywhere
    for tenor in ["M12", "Y7", "Y20", "Y50"] {
        assert_abs_diff_eq!(curve.values[tenor], curve.parameters[0], epsilon = 1e-15);
    }
}

#[test]
fn test_long_short_curve_recovered() {
    let tenors = ["M6", "M12", "Y2", "Y3", "Y5", "Y7", "Y10"];
    let truth = LongShortNsParametrization::default();
    let true_params = [0.015, 0.03];
    let input = with_fair_upfronts(create_input("LS", &tenors), &truth, &true_params);

    let curve = calibrate_credit_curve(&input, &create_test_config())
        .expect("calibration should succeed")
        .expect("quotes should be usable");

    println!("True parameters:       {:?}", true_params);
    println!("Calibrated parameters: {:?}", curve.parameters);
    println!("Pricing errors:        {:?}", curve.pricing_errors);

    assert_eq!(curve.parametrization, Parametrization::default());
    assert_eq!(curve.pricing_errors.len(), tenors.len());
    assert!(curve.max_abs_pricing_error() < 5e-4, "max error {}", curve.max_abs_pricing_error());

    let true_curve = truth.evaluate(&true_params).unwrap();
    assert_abs_diff_eq!(curve.values["M12"], true_curve.value(1.0), epsilon = 5e-3);
    assert_abs_diff_eq!(curve.values["Y7"], true_curve.value(7.0), epsilon = 5e-3);
}

/// Quotes implying no default risk pin the hazard rate to the lower bound.
#[test]
fn test_zero_hazard_at_lower_bound() {
    let input = with_fair_upfronts(create_input("SAFE", &["Y3"]), &FlatParametrization, &[0.0]);
    assert!(input.upfront_payments["Y3"] < 0.0);

    let curve = calibrate_credit_curve(&input, &create_flat_config())
        .unwrap()
        .unwrap();
    println!("Hazard at the bound: {:e}", curve.parameters[0]);
    assert!(curve.parameters[0] >= 0.0);
    assert!(curve.parameters[0] < 1e-4);
}

#[test]
fn test_short_tenors_are_ignored() {
    let input = create_input("SHORT", &["ON", "W1", "M1", "M2"]);
    let result = calibrate_credit_curve(&input, &ExtractionConfig::default()).unwrap();
    assert!(result.is_none(), "no tenor reaches three months");
}

#[test]
fn test_parallel_matches_sequential() {
    let inputs = vec![
        with_fair_upfronts(create_input("A", &["M12", "Y5"]), &FlatParametrization, &[0.01]),
        with_fair_upfronts(create_input("B", &["M12", "Y3", "Y7"]), &FlatParametrization, &[0.04]),
        with_fair_upfronts(create_input("C", &["Y1", "Y10"]), &FlatParametrization, &[0.1]),
        create_input("D", &["X5"]),
    ];
    let config = create_flat_config();

    let sequential = calibrate_credit_curves(&inputs, &config).unwrap();
    let parallel = par_calibrate_credit_curves(&inputs, &config).unwrap();

    assert_eq!(sequential.keys().collect::<Vec<_>>(), vec!["A", "B", "C"]);
    assert_eq!(sequential, parallel);
    assert_abs_diff_eq!(sequential["C"].parameters[0], 0.1, epsilon = 1e-3);
}

#[test]
fn test_config_from_toml() {
    let content = r#"
        report_tenors = ["M12", "Y5"]
        min_tenor_years = 0.5

        [parametrization]
        kind = "long_short_ns"
        transition_time = 10.0

        [objective]
        long_term_weight = 0.01

        [initial_guess]
        kind = "explicit"
        values = [0.02, 0.04]

        [integrator]
        tolerance = 1e-9
    "#;

    let config = ExtractionConfig::from_toml_str(content).expect("valid config");
    assert_eq!(
        config.parametrization,
        Parametrization::LongShortNs { transition_time: 10.0 }
    );
    assert_eq!(config.objective.long_term_weight, 0.01);
    assert_eq!(config.objective.long_term_low, 0.05);
    assert_eq!(config.initial_guess, InitialGuess::Explicit { values: vec![0.02, 0.04] });
    assert_eq!(config.integrator.tolerance, 1e-9);
    assert_eq!(config.integrator.max_depth, 10);
    assert_eq!(config.outer_iterations_per_parameter, 2);

    let input = with_fair_upfronts(
        create_input("TOML", &["M3", "M12", "Y5"]),
        &LongShortNsParametrization::default(),
        &[0.02, 0.03],
    );
    let curve = calibrate_credit_curve(&input, &config).unwrap().unwrap();
    assert_eq!(curve.values.keys().collect::<Vec<_>>(), vec!["M12", "Y5"]);
    // M3 is below the configured minimum tenor
    assert_eq!(curve.pricing_errors.keys().collect::<Vec<_>>(), vec!["M12", "Y5"]);
}

#[test]
fn test_invalid_toml_config() {
    let wrong_guess = r#"
        [initial_guess]
        kind = "explicit"
        values = [0.02]
    "#;
    assert!(ExtractionConfig::from_toml_str(wrong_guess).is_err());

    let wrong_bounds = r#"
        [bounds]
        min_rate = 0.5
        max_rate = 0.1
    "#;
    assert!(ExtractionConfig::from_toml_str(wrong_bounds).is_err());
}

#[test]
fn test_stabilized_preset() {
    let input = with_fair_upfronts(
        create_input("STAB", &["M12", "Y3", "Y5", "Y10"]),
        &LongShortNsParametrization::default(),
        &[0.01, 0.08],
    );
    let curve = calibrate_credit_curve(&input, &ExtractionConfig::stabilized())
        .unwrap()
        .unwrap();

    println!("Stabilized parameters: {:?}, objective {:e}", curve.parameters, curve.objective);
    assert!(curve.objective.is_finite());
    assert!(curve.parameters.iter().all(|p| (0.0..=3.0).contains(p)));
    assert!(curve.max_abs_pricing_error() < 1e-2);
}

#[test]
fn test_load_inputs_from_json() {
    let issuers = vec!["ACME".to_string(), "BROKEN".to_string(), "MISSING".to_string()];
    let inputs = load_cds_inputs("tests/data", &issuers);

    assert_eq!(inputs.len(), 1);
    let acme = &inputs["ACME"];
    assert_eq!(acme.name, "Acme Industries");
    assert_eq!(acme.upfront_payments.len(), 7);
    assert_eq!(acme.interest_curve["Y10"], 0.0368);

    let assets = input_to_assets(acme, 0.25).unwrap();
    assert_eq!(assets.len(), 7);
    assert_eq!(assets[0].tenor.to_string(), "M6");
    assert_eq!(assets[6].tenor.to_string(), "Y10");

    let curve = calibrate_credit_curve(acme, &ExtractionConfig::standard())
        .unwrap()
        .unwrap();
    println!("ACME curve: {:?}", curve.values);
    assert!(curve.max_abs_pricing_error() < 1e-2);

    // The calibrated curve reprices the quotes no worse than the starting point
    let pricer = CdsPricer::default();
    let start = LongShortNsParametrization::default().evaluate(&[0.05, 0.05]).unwrap();
    let fitted = curve.term_structure().unwrap();
    let fitted_sse = pricer.sum_of_squared_errors(&assets, fitted.as_ref());
    assert!(fitted_sse < pricer.sum_of_squared_errors(&assets, start.as_ref()));
}

#[test]
fn test_csv_report_round_trip() {
    let inputs = vec![
        with_fair_upfronts(create_input("A", &["Y5"]), &FlatParametrization, &[0.02]),
        with_fair_upfronts(create_input("B", &["Y5"]), &FlatParametrization, &[0.05]),
    ];
    let config = create_flat_config();
    let curves = calibrate_credit_curves(&inputs, &config).unwrap();

    let mut buffer = Vec::new();
    write_curves_csv(&mut buffer, &curves, &config.report_tenors).unwrap();

    let mut reader = csv::Reader::from_reader(buffer.as_slice());
    let header: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
    assert_eq!(header, vec!["id", "M12", "Y7", "Y20", "Y50"]);

    let rows: BTreeMap<String, Vec<f64>> = reader
        .records()
        .map(|record| {
            let record = record.unwrap();
            let values = record.iter().skip(1).map(|v| v.parse().unwrap()).collect();
            (record[0].to_string(), values)
        })
        .collect();

    assert_eq!(rows.len(), 2);
    for (id, values) in &rows {
        assert_eq!(values.len(), 4);
        for v in values {
            assert_abs_diff_eq!(*v, curves[id].parameters[0], epsilon = 1e-6);
        }
    }
}
