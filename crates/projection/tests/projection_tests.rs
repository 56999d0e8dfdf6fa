//! Round-trip and domain tests across every supported projection.

use diag_common::{GridPoint, LatLon, TimeIndex};
use projection::{
    GridProjection, GridProjectionParams, IndexMode, MapProjection, Projection, ProjectionError,
    ProjectionKind,
};
use test_utils::{assert_coords_approx_eq, domain, fixed_projection, moving_nest};

fn with_kind(kind: ProjectionKind, truelat1: f64, ref_lat: f64, ref_lon: f64) -> GridProjectionParams {
    GridProjectionParams {
        kind,
        truelat1,
        truelat2: truelat1,
        stand_lon: -100.0,
        ..GridProjectionParams::lambert(
            30.0, 60.0, -100.0, ref_lat, ref_lon, 10000.0, 10000.0, 50, 40,
        )
    }
}

fn all_domains() -> Vec<GridProjectionParams> {
    let mut rotated = GridProjectionParams::latlon(-10.0, -20.0, 0.1, 0.1, 50, 40);
    rotated.kind = ProjectionKind::RotatedLatLon;
    rotated.pole_lat = 40.0;
    rotated.pole_lon = -170.0;

    vec![
        domain::central_us_lambert(50, 40),
        with_kind(ProjectionKind::PolarStereographic, 60.0, 55.0, -120.0),
        with_kind(ProjectionKind::Mercator, 20.0, 10.0, -80.0),
        domain::regional_latlon(50, 40),
        rotated,
    ]
}

// ============================================================================
// Round trips
// ============================================================================

#[test]
fn test_index_latlon_round_trip_all_kinds() {
    for params in all_domains() {
        let proj = Projection::from_params(&params).unwrap();
        for (i, j) in [(0.0, 0.0), (12.5, 7.25), (49.0, 39.0), (25.0, 20.0)] {
            let (lat, lon) = proj.grid_to_geo(i, j);
            let (bi, bj) = proj.geo_to_grid(lat, lon);
            assert_coords_approx_eq!((bi, bj), (i, j), 1e-5);
        }
    }
}

#[test]
fn test_reference_point_maps_to_origin() {
    let proj = fixed_projection(domain::central_us_lambert(30, 20), 1);
    let origin = proj.to_latlon(0.0, 0.0, 0).unwrap();
    assert_coords_approx_eq!((origin.lat, origin.lon), (34.0, -104.0), 1e-9);
}

#[test]
fn test_nearest_mode_rounds_indices() {
    let proj = fixed_projection(domain::regional_latlon(20, 20), 1);
    let ll = proj.to_latlon(3.4, 6.6, 0).unwrap();
    let result = proj.to_index(ll.lat, ll.lon, 0, IndexMode::Nearest).unwrap();
    assert_eq!(result.point, GridPoint::new(3.0, 7.0));
    assert!(!result.out_of_domain);
}

// ============================================================================
// Domain handling
// ============================================================================

#[test]
fn test_out_of_domain_is_flagged() {
    let proj = fixed_projection(domain::regional_latlon(20, 20), 1);
    let result = proj.to_index(10.0, -105.0, 0, IndexMode::Fractional).unwrap();
    assert!(result.out_of_domain);
    assert!(result.point.y < 0.0);
    assert!(matches!(
        result.require_in_domain(),
        Err(ProjectionError::OutOfDomain { .. })
    ));
}

#[test]
fn test_invalid_time_step() {
    let proj = fixed_projection(domain::regional_latlon(20, 20), 2);
    let err = proj.to_latlon(1.0, 1.0, 4).unwrap_err();
    assert_eq!(err, ProjectionError::InvalidTimeIndex { index: 4, available: 2 });
}

#[test]
fn test_empty_projection_rejected() {
    assert!(GridProjection::new(Vec::new()).is_err());
}

// ============================================================================
// Moving nests
// ============================================================================

#[test]
fn test_moving_nest_batches_per_time() {
    let nest = moving_nest(40, 30, 3, 0.25);
    let target = nest.to_latlon(20.0, 15.0, 0).unwrap();

    let batch = nest
        .to_index_batch(&[target], TimeIndex::All, IndexMode::Fractional)
        .unwrap();
    assert_eq!(batch.len(), 3);
    assert_coords_approx_eq!((batch[0][0].point.x, batch[0][0].point.y), (20.0, 15.0), 1e-6);
    // The grid moves north-east underneath a fixed point
    assert!(batch[2][0].point.x < batch[1][0].point.x);
    assert!(batch[2][0].point.y < batch[1][0].point.y);

    let single = nest
        .to_latlon_batch(&[GridPoint::new(0.0, 0.0)], TimeIndex::Single(2))
        .unwrap();
    assert_eq!(single.len(), 1);
    let corner: LatLon = single[0][0];
    assert_coords_approx_eq!((corner.lat, corner.lon), (34.5, -103.5), 1e-9);
}

#[test]
fn test_map_proj_codes_select_kind() {
    assert_eq!(
        ProjectionKind::from_map_proj(2, 90.0, 0.0).unwrap(),
        ProjectionKind::PolarStereographic
    );
    assert_eq!(ProjectionKind::from_map_proj(3, 90.0, 0.0).unwrap(), ProjectionKind::Mercator);
    assert!(ProjectionKind::from_map_proj(99, 90.0, 0.0).is_err());
}
