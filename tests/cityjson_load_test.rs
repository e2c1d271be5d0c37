// Loading CityJSON documents into a City
use cityjson_io::{assemble, load_city_file, CityJsonError, LoadOptions, Point3, Warning};
use serde_json::{json, Value};

const FIXTURE: &str = "tests/data/two_buildings.city.json";

fn assert_close(actual: &Point3, expected: (f64, f64, f64)) {
    let (x, y, z) = expected;
    assert!(
        (actual.x - x).abs() < 1e-9 && (actual.y - y).abs() < 1e-9 && (actual.z - z).abs() < 1e-9,
        "expected ({}, {}, {}), got {:?}",
        x,
        y,
        z,
        actual
    );
}

fn square_document() -> Value {
    json!({
        "type": "CityJSON",
        "version": "2.0",
        "transform": {"scale": [1.0, 1.0, 1.0], "translate": [0.0, 0.0, 0.0]},
        "CityObjects": {
            "house": {
                "type": "Building",
                "geometry": [{
                    "type": "MultiSurface",
                    "lod": 2,
                    "boundaries": [[[0, 1, 2, 3]]]
                }]
            }
        },
        "vertices": [[0, 0, 0], [10, 0, 0], [10, 10, 0], [0, 10, 0]]
    })
}

#[test]
fn test_single_square_building() {
    let city = assemble(&square_document(), &LoadOptions::default()).expect("Failed to assemble city");

    assert_eq!(city.buildings().len(), 1);
    let building = &city.buildings()[0];
    assert_eq!(building.id(), "house");

    let ms = building.lod(2).expect("LOD 2 geometry missing");
    assert_eq!(ms.surfaces.len(), 1);
    let points = &ms.surfaces[0].points;
    assert_eq!(points.len(), 4);
    assert_close(&points[0], (0.0, 0.0, 0.0));
    assert_close(&points[1], (10.0, 0.0, 0.0));
    assert_close(&points[2], (10.0, 10.0, 0.0));
    assert_close(&points[3], (0.0, 10.0, 0.0));

    assert!(city.terrain().is_none());
    assert!(city.warnings().is_empty());
    println!("✓ Square building resolved: {:?}", points);
}

#[test]
fn test_unsupported_type_is_warning() {
    let mut doc = square_document();
    doc["CityObjects"]["oak"] = json!({"type": "Tree"});

    let city = assemble(&doc, &LoadOptions::default()).expect("Failed to assemble city");
    assert_eq!(city.buildings().len(), 1);
    assert_eq!(city.warnings().len(), 1);
    assert_eq!(
        city.warnings()[0],
        Warning::UnsupportedObject {
            id: "oak".into(),
            source: CityJsonError::UnsupportedObjectType("Tree".into())
        }
    );
    assert!(city.warnings()[0].to_string().contains("Tree"));
}

#[test]
fn test_building_count_matches_root_buildings() {
    let mut objects = serde_json::Map::new();
    for i in 0..12 {
        objects.insert(
            format!("b{}", i),
            json!({"type": "Building", "children": [format!("b{}-part", i)]}),
        );
        objects.insert(
            format!("b{}-part", i),
            json!({"type": "BuildingPart", "parents": [format!("b{}", i)]}),
        );
    }
    objects.insert("road".into(), json!({"type": "Road"}));
    let doc = json!({"type": "CityJSON", "CityObjects": objects, "vertices": []});

    let city = assemble(&doc, &LoadOptions::default()).expect("Failed to assemble city");
    assert_eq!(city.buildings().len(), 12);
    assert!(city.buildings().iter().all(|b| b.parts().len() == 1));

    // Document order is preserved
    let ids: Vec<&str> = city.buildings().iter().map(|b| b.id()).collect();
    let expected: Vec<String> = (0..12).map(|i| format!("b{}", i)).collect();
    assert_eq!(ids, expected.iter().map(String::as_str).collect::<Vec<_>>());
}

#[test]
fn test_broken_geometry_does_not_abort_load() {
    let mut doc = square_document();
    doc["CityObjects"]["broken"] = json!({
        "type": "Building",
        "geometry": [{"type": "MultiSurface", "lod": 2, "boundaries": [[[0, 1, 99]]]}]
    });
    doc["CityObjects"]["odd"] = json!({
        "type": "Building",
        "geometry": [{"type": "MultiPoint", "lod": 2, "boundaries": [0, 1]}]
    });

    let city = assemble(&doc, &LoadOptions::default()).expect("Failed to assemble city");
    assert_eq!(city.buildings().len(), 3);

    let broken = city.building("broken").unwrap();
    assert!(broken.geometry().is_empty());
    assert_eq!(broken.errors(), &[CityJsonError::IndexOutOfRange { index: 99, len: 4 }]);

    let odd = city.building("odd").unwrap();
    assert_eq!(odd.errors(), &[CityJsonError::UnsupportedGeometryType("MultiPoint".into())]);

    assert_eq!(city.warnings().len(), 2);
    assert!(city.building("house").unwrap().lod(2).is_some());
}

#[test]
fn test_fatal_errors_return_no_city() {
    let options = LoadOptions::default();

    let err = assemble(&json!({"type": "CityJSONFeature"}), &options).unwrap_err();
    assert!(matches!(err, CityJsonError::NotACityDocument(_)));

    let mut doc = square_document();
    doc["transform"]["translate"] = json!([0.0, 0.0, 0.0, 0.0]);
    let err = assemble(&doc, &options).unwrap_err();
    assert_eq!(err, CityJsonError::MalformedTransform { field: "translate", len: 4 });

    let err = cityjson_io::parse_str("not json at all", &options).unwrap_err();
    assert!(matches!(err, CityJsonError::MalformedDocument(_)));
}

#[test]
fn test_bounds_fallback_from_buildings() {
    let city = assemble(&square_document(), &LoadOptions::default()).unwrap();
    let bounds = city.bounds().expect("bounds computed from geometry");
    assert_eq!((bounds.xmin, bounds.ymin, bounds.xmax, bounds.ymax), (0.0, 0.0, 10.0, 10.0));

    let empty = assemble(&json!({"type": "CityJSON", "CityObjects": {}, "vertices": []}), &LoadOptions::default()).unwrap();
    assert!(empty.bounds().is_none());
}

#[test]
fn test_only_first_terrain_source_is_welded() {
    let doc = json!({
        "type": "CityJSON",
        "CityObjects": {
            "dtm-a": {"type": "TINRelief", "geometry": [{"type": "CompositeSurface", "lod": 1, "boundaries": [[[4, 2, 3]]]}]},
            "dtm-b": {"type": "TINRelief", "geometry": [{"type": "CompositeSurface", "lod": 1, "boundaries": [[[0, 1, 2]]]}]}
        },
        "vertices": [[0, 0, 0], [1, 0, 0], [2, 0, 0], [3, 0, 0], [4, 0, 0]]
    });
    let city = assemble(&doc, &LoadOptions::default()).unwrap();

    let mesh = city.terrain_mesh().expect("terrain mesh");
    let xs: Vec<f64> = mesh.vertices().iter().map(|p| p.x).collect();
    assert_eq!(xs, vec![2.0, 3.0, 4.0]);
    assert_eq!(mesh.faces(), &[[2, 0, 1]]);
    assert_eq!(
        city.warnings(),
        &[Warning::TerrainSourcesIgnored { used: "dtm-a".into(), ignored: 1 }]
    );
}

#[test]
fn test_empty_terrain_not_attached() {
    let doc = json!({
        "type": "CityJSON",
        "CityObjects": {"dtm": {"type": "TINRelief", "geometry": []}},
        "vertices": []
    });
    let city = assemble(&doc, &LoadOptions::default()).unwrap();
    assert!(city.terrain().is_none());
    assert!(city.warnings().is_empty());
}

#[test]
fn test_fixture_file() {
    let city = load_city_file(FIXTURE).expect("Failed to load fixture");

    let ids: Vec<&str> = city.buildings().iter().map(|b| b.id()).collect();
    assert_eq!(ids, vec!["b1", "b2"]);

    let b1 = &city.buildings()[0];
    assert_eq!(b1.attributes()["roofType"], "flat");
    assert_eq!(b1.geometry().keys().copied().collect::<Vec<_>>(), vec![2]);
    let solid = b1.lod(2).unwrap();
    assert_eq!(solid.len(), 6, "only the exterior shell is resolved");
    assert_eq!(solid.semantic(0).unwrap()["type"], "GroundSurface");
    assert_eq!(solid.semantic(1).unwrap()["type"], "RoofSurface");
    assert_close(&solid.surfaces[1].points[2], (1010.0, 2010.0, 5.0));

    let part = &b1.parts()[0];
    assert_eq!(part.id(), "b1-p1");
    assert_eq!(part.parent_id(), "b1");
    assert_close(&part.lod(2).unwrap().surfaces[0].points[0], (1000.0, 2000.0, 8.0));

    // "2.2" is read as LOD 2
    assert!(city.buildings()[1].lod(2).is_some());

    let mesh = city.terrain_mesh().expect("terrain mesh");
    assert_eq!(mesh.vertex_count(), 4);
    assert_eq!(mesh.face_count(), 2);
    assert_close(&mesh.vertices()[0], (990.0, 1990.0, -0.1));

    let bounds = city.bounds().unwrap();
    assert_eq!((bounds.xmin, bounds.ymin, bounds.xmax, bounds.ymax), (990.0, 1990.0, 1040.0, 2020.0));

    assert_eq!(city.warnings().len(), 1);
    let summary = city.summary();
    assert_eq!(summary.buildings, 2);
    assert_eq!(summary.building_parts, 1);
    assert_eq!(summary.surfaces, 8);
    println!("✓ Fixture loaded: {:?}", summary);
}

#[test]
fn test_fixture_prefer_solid_and_lower_lod() {
    let options = LoadOptions {
        lods: vec![1],
        prefer_surface: false,
        parallel: false,
    };
    let city = cityjson_io::load_city_file_with(FIXTURE, &options).unwrap();
    let b1 = &city.buildings()[0];
    assert_eq!(b1.geometry().keys().copied().collect::<Vec<_>>(), vec![1]);
    assert_eq!(b1.lod(1).unwrap().len(), 1);

    // b2 only has a single candidate, which wins whatever its LOD
    assert!(city.buildings()[1].lod(2).is_some());
}

#[test]
fn test_missing_file_reports_path() {
    let err = load_city_file("tests/data/does_not_exist.city.json").unwrap_err();
    assert!(format!("{:#}", err).contains("does_not_exist"));
}
