//! Catalog-level tests across the public API.

use t500rs_curves::{CurveError, CurveParams, WeightCurve, WeightCurveKind};

fn must<T, E: std::fmt::Debug>(result: Result<T, E>) -> T {
    match result {
        Ok(v) => v,
        Err(e) => panic!("unexpected error: {:?}", e),
    }
}

#[test]
fn test_full_catalog_constructs_with_matching_params() {
    let cases: Vec<(WeightCurveKind, CurveParams)> = vec![
        (WeightCurveKind::Linear, CurveParams::None),
        (WeightCurveKind::Exponential, CurveParams::None),
        (WeightCurveKind::Logarithmic, CurveParams::None),
        (WeightCurveKind::Sigmoid, CurveParams::None),
        (
            WeightCurveKind::Sine,
            CurveParams::Wave {
                frequency: 2,
                phase: 0,
            },
        ),
        (
            WeightCurveKind::Cosine,
            CurveParams::Wave {
                frequency: 2,
                phase: 64,
            },
        ),
        (WeightCurveKind::Smoothstep, CurveParams::None),
        (WeightCurveKind::Smootherstep, CurveParams::None),
        (
            WeightCurveKind::Bounce,
            CurveParams::Bounce {
                bounces: 3,
                decay: 8,
            },
        ),
        (
            WeightCurveKind::Elastic,
            CurveParams::Elastic {
                elasticity: 5,
                damping: 2,
            },
        ),
        (WeightCurveKind::Quadratic, CurveParams::None),
        (WeightCurveKind::Cubic, CurveParams::None),
        (
            WeightCurveKind::Pulse,
            CurveParams::Pulse {
                width: 10,
                duty_cycle: 128,
                rise: 4,
                fall: 4,
            },
        ),
        (WeightCurveKind::RampHold, CurveParams::None),
        (
            WeightCurveKind::Triangle,
            CurveParams::Wave {
                frequency: 1,
                phase: 0,
            },
        ),
        (
            WeightCurveKind::Sawtooth,
            CurveParams::Wave {
                frequency: 1,
                phase: 0,
            },
        ),
        (WeightCurveKind::Noise, CurveParams::None),
        (WeightCurveKind::Spring, CurveParams::None),
        (
            WeightCurveKind::Custom,
            CurveParams::Custom {
                points: [0, 32, 64, 96, 128, 160, 192, 255],
            },
        ),
    ];

    for (kind, params) in cases {
        let curve = must(WeightCurve::new(kind, 16, params));
        assert_eq!(curve.kind(), kind);
        // Host evaluation exists exactly for the five closed-form kinds.
        assert_eq!(curve.evaluate(0.5).is_some(), kind.is_host_evaluated());
    }
}

#[test]
fn test_device_kind_with_missing_params_rejected() {
    assert_eq!(
        WeightCurve::new(WeightCurveKind::Custom, 0, CurveParams::None),
        Err(CurveError::ParamsMismatch {
            kind: "custom",
            params: "none",
        })
    );
    assert!(WeightCurve::new(WeightCurveKind::Bounce, 0, CurveParams::None).is_err());
    assert!(WeightCurve::new(WeightCurveKind::Elastic, 0, CurveParams::None).is_err());
}

#[test]
fn test_wire_ids_cover_catalog_contiguously() {
    for id in 0..=18u8 {
        let kind = must(WeightCurveKind::from_wire_id(id));
        assert_eq!(kind.wire_id(), id);
    }
    assert!(WeightCurveKind::from_wire_id(19).is_err());
}
