//! Box room sessions: materials per face, failure handling, configuration

use num_complex::Complex64;
use sea_bem::core::material::PorousLayer;
use sea_bem::core::{AirProperties, FrequencyGrid, GridPolicy, MaterialKind, Receiver, SourceSpec};
use sea_bem::simulation::{
    AirConfig, FrequencyConfig, MeshConfig, RunOptions, Session, SimulationConfig,
};
use sea_bem::testing::{shoebox, shoebox_regions};

const ROOM: [f64; 3] = [2.0, 1.5, 1.2];

fn room(materials: Vec<MaterialKind>) -> Session {
    let air = AirProperties::default();
    let mut session = Session::new(air);
    // below the first axial mode (c / 2L ≈ 86 Hz)
    session
        .set_frequencies(FrequencyGrid::from_values(vec![40.0, 60.0], air.sound_speed).unwrap())
        .unwrap();
    session.set_mesh(shoebox(ROOM, 0.5).unwrap()).unwrap();
    for kind in materials {
        session.add_material(kind).unwrap();
    }
    session
        .add_source(SourceSpec::monopole([0.5, 0.5, 0.6]), GridPolicy::default())
        .unwrap();
    session.add_receiver(Receiver::omni([1.5, 1.0, 0.6])).unwrap();
    session
}

#[test]
fn test_room_with_absorbing_floor() {
    let mut materials = vec![MaterialKind::Rigid; 6];
    materials[shoebox_regions::FLOOR] = MaterialKind::Porous(PorousLayer {
        flow_resistivity: 10_000.0,
        thickness: 0.1,
    });

    let rigid = room(vec![]).run(&RunOptions::default()).unwrap();
    let treated = room(materials).run(&RunOptions::default()).unwrap();

    for results in [&rigid, &treated] {
        assert!(results.failed_frequencies().is_empty());
        assert_eq!(results.receivers.len(), 1);
        assert!(results.receivers[0].is_complete());
        assert!(results.boundary.is_none());
    }

    let a = rigid.receivers[0].samples[1].unwrap();
    let b = treated.receivers[0].samples[1].unwrap();
    assert_eq!(a.incident, b.incident);
    assert!((a.total - b.total).norm() > 1e-3 * a.total.norm());
    // below the first mode the room raises the level above free field
    assert!(a.total.norm() > a.incident.norm());
}

#[test]
fn test_material_count_must_cover_regions() {
    let session = room(vec![MaterialKind::Rigid; 5]);
    let err = session.run(&RunOptions::default()).unwrap_err();
    assert!(err.is_configuration());
}

#[test]
fn test_table_material_on_wrong_grid() {
    let mut session = room(vec![]);
    let err = session
        .add_material(MaterialKind::Admittance {
            values: vec![Complex64::new(1e-3, 0.0); 3],
        })
        .unwrap_err();
    assert!(err.is_inconsistent_grid());
}

#[test]
fn test_config_file_round_trip_and_run() {
    let config = SimulationConfig {
        air: AirConfig::Conditions {
            temperature: 20.0,
            humidity: 50.0,
            atmospheric_pressure: 101_325.0,
        },
        frequencies: FrequencyConfig::Values { values: vec![50.0] },
        mesh: MeshConfig::Shoebox {
            dimensions: ROOM,
            element_size: 0.6,
        },
        materials: vec![],
        sources: vec![SourceSpec::monopole([0.5, 0.5, 0.6])],
        grid_policy: GridPolicy::default(),
        receivers: vec![Receiver::omni([1.5, 1.0, 0.6])],
        solver: RunOptions::default().with_boundary_solutions(true),
    };

    let path = std::env::temp_dir().join(format!("sea-bem-config-{}.json", std::process::id()));
    config.to_file(&path).unwrap();
    let loaded = SimulationConfig::from_file(&path).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(loaded, config);

    let results = loaded.to_session().unwrap().run(&loaded.solver).unwrap();
    assert_eq!(results.boundary.as_ref().map(Vec::len), Some(1));
    assert!(results.receivers[0].spl_db()[0].is_some());
}
