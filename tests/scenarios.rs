use nalgebra::{DVector, Vector2};
use phase_flow::io::{CsvRenderer, SummaryRenderer};
use phase_flow::sim::{Adams, AdamsOptions, FixedStep, Integrator};
use phase_flow::{
    LorenzConfig, LotkaVolterra, LotkaVolterraConfig, LotkaVolterraParams, OdeError, Pipeline,
    TimeGrid,
};

#[test]
fn canonical_lorenz_run_stays_finite() {
    let traj = Pipeline::lorenz(&LorenzConfig::default()).run().unwrap();

    assert_eq!(traj.len(), 5001);
    let (t0, first) = traj.first().unwrap();
    assert_eq!(t0, 0.0);
    assert_eq!(first.as_slice(), &[1.0, 1.0, 1.0]);
    assert!(traj.is_finite(), "non-finite at {:?}", traj.first_non_finite());

    // The attractor is bounded; Euler at dt=0.01 stays within a generous box.
    for (_, s) in traj.iter() {
        assert!(s[0].abs() < 60.0 && s[1].abs() < 60.0 && s[2] > -5.0 && s[2] < 80.0);
    }
}

#[test]
fn canonical_predator_prey_oscillates() {
    let traj = Pipeline::lotka_volterra(&LotkaVolterraConfig::default())
        .run()
        .unwrap();

    assert_eq!(traj.len(), 1000);
    assert_eq!(traj.first().unwrap().1.as_slice(), &[2.0, 2.0]);
    assert_eq!(traj.last().unwrap().0, 15.0);
    for (t, s) in traj.iter() {
        assert!(s[0] > 0.0 && s[1] > 0.0, "population hit zero at t={t}: {s:?}");
    }
    let peaks = traj.local_maxima(0);
    assert!(peaks.len() >= 2, "prey peaks: {peaks:?}");
}

#[test]
fn euler_refinement_converges_to_adaptive_solution() {
    let lv = LotkaVolterra::new(LotkaVolterraParams::default());
    let y0 = DVector::from_vec(vec![2.0, 2.0]);
    let t_end = 15.0;

    let reference = Adams::new(AdamsOptions {
        rtol: 1e-10,
        atol: 1e-12,
        ..Default::default()
    })
    .integrate(&lv, &y0, &TimeGrid::linspace(0.0, t_end, 2))
    .unwrap();
    let target = reference.last().unwrap().1.clone();

    let errors: Vec<f64> = [1_500, 15_000, 150_000]
        .into_iter()
        .map(|steps| {
            let grid = TimeGrid::uniform(0.0, t_end / steps as f64, steps);
            let traj = FixedStep::euler().integrate(&lv, &y0, &grid).unwrap();
            (traj.last().unwrap().1 - &target).norm()
        })
        .collect();

    assert!(errors[1] < errors[0] && errors[2] < errors[1], "{errors:?}");
    // First-order method: tenfold refinement gives roughly tenfold less error.
    assert!(errors[2] < errors[0] / 20.0, "{errors:?}");
}

#[test]
fn rk4_agrees_with_adams_on_predator_prey() {
    let lv = LotkaVolterra::default();
    let y0 = DVector::from_vec(vec![2.0, 2.0]);
    let grid = TimeGrid::linspace(0.0, 15.0, 1501);
    let rk4 = FixedStep::rk4().integrate(&lv, &y0, &grid).unwrap();
    let adams = Adams::new(AdamsOptions {
        rtol: 1e-9,
        ..Default::default()
    })
    .integrate(&lv, &y0, &grid)
    .unwrap();
    for (a, b) in rk4.states().iter().zip(adams.states()) {
        assert!((a - b).amax() < 1e-5);
    }
}

#[test]
fn adams_conserves_predator_prey_invariant_over_long_run() {
    let lv = LotkaVolterra::default();
    let grid = TimeGrid::linspace(0.0, 100.0, 200);
    let traj = Adams::new(AdamsOptions {
        rtol: 1e-8,
        ..Default::default()
    })
    .integrate(&lv, &DVector::from_vec(vec![5.0, 1.0]), &grid)
    .unwrap();
    let v0 = lv.first_integral(&Vector2::new(5.0, 1.0));
    let (_, last) = traj.last().unwrap();
    let v_end = lv.first_integral(&Vector2::new(last[0], last[1]));
    assert!((v_end - v0).abs() < 1e-4, "drift {}", v_end - v0);
}

#[test]
fn single_time_point_returns_initial_condition() {
    let cfg = LotkaVolterraConfig {
        times: Some(vec![4.0]),
        ..Default::default()
    };
    let traj = Pipeline::lotka_volterra(&cfg).run().unwrap();
    assert_eq!(traj.len(), 1);
    assert_eq!(traj.first().unwrap(), (4.0, &DVector::from_vec(vec![2.0, 2.0])));

    let cfg = LorenzConfig {
        steps: 0,
        ..Default::default()
    };
    let traj = Pipeline::lorenz(&cfg).run().unwrap();
    assert_eq!(traj.len(), 1);
    assert_eq!(traj.first().unwrap().1.as_slice(), &[1.0, 1.0, 1.0]);
}

#[test]
fn malformed_grids_are_usage_errors() {
    let cases = [
        LotkaVolterraConfig {
            times: Some(vec![]),
            ..Default::default()
        },
        LotkaVolterraConfig {
            times: Some(vec![0.0, 1.0, 0.5]),
            ..Default::default()
        },
        LotkaVolterraConfig {
            times: Some(vec![0.0, 0.0]),
            ..Default::default()
        },
    ];
    for cfg in &cases {
        let err = Pipeline::lotka_volterra(cfg).run().unwrap_err();
        assert!(err.is_usage(), "{err}");
    }

    let err = Pipeline::lorenz(&LorenzConfig {
        dt: -0.01,
        ..Default::default()
    })
    .run()
    .unwrap_err();
    assert!(matches!(err, OdeError::InvalidStep { .. }));

    // A step below the float spacing at t0 would repeat sample times.
    let err = Pipeline::lorenz(&LorenzConfig {
        t0: 1e16,
        dt: 1.0,
        steps: 3,
        ..Default::default()
    })
    .run()
    .unwrap_err();
    assert!(matches!(err, OdeError::NonIncreasingTime { .. }), "{err}");

    let err = Pipeline::lorenz(&LorenzConfig {
        dt: 1e308,
        steps: 3,
        ..Default::default()
    })
    .run()
    .unwrap_err();
    assert!(matches!(err, OdeError::NonFiniteTime { .. }), "{err}");
}

#[test]
fn zero_absolute_tolerance_is_rejected_before_integrating() {
    let cfg = LotkaVolterraConfig {
        initial: [2.0, 0.0],
        solver: AdamsOptions {
            atol: 0.0,
            ..Default::default()
        },
        ..Default::default()
    };
    let err = Pipeline::lotka_volterra(&cfg).run().unwrap_err();
    assert!(matches!(err, OdeError::InvalidOption { .. }), "{err}");
}

#[test]
fn extreme_parameters_degrade_to_non_finite_not_errors() {
    // Huge sigma with a coarse step makes explicit Euler blow up.
    let cfg = LorenzConfig {
        params: phase_flow::LorenzParams {
            sigma: 1e6,
            rho: 28.0,
            beta: 8.0 / 3.0,
        },
        steps: 2000,
        ..Default::default()
    };
    let traj = Pipeline::lorenz(&cfg).run().unwrap();
    assert_eq!(traj.len(), 2001);
    assert!(traj.first_non_finite().is_some());
}

#[test]
fn both_pipelines_render_into_shared_renderers() {
    let mut summaries = SummaryRenderer::new();
    let mut csv = CsvRenderer::new(Vec::new());

    let lorenz = Pipeline::lorenz(&LorenzConfig {
        steps: 100,
        ..Default::default()
    });
    let lv = Pipeline::lotka_volterra(&LotkaVolterraConfig {
        samples: 20,
        ..Default::default()
    });

    lorenz.run_into(&mut summaries).unwrap();
    lv.run_into(&mut summaries).unwrap();
    lv.run_into(&mut csv).unwrap();

    assert_eq!(summaries.summaries.len(), 2);
    assert_eq!(summaries.summaries[0].samples, 101);
    assert!(summaries.summaries[1].component("predator").is_some());

    let text = String::from_utf8(csv.into_inner()).unwrap();
    assert_eq!(text.lines().next(), Some("t,prey,predator"));
    assert_eq!(text.lines().count(), 21);
}
