// Write a loaded city back to CityJSON and load it again
use cityjson_io::{
    assemble, city_to_cityjson, city_to_file, city_to_string, load_city_file_with, parse_str, BuildingIndex, Bounds,
    City, LoadOptions,
};

const FIXTURE: &str = "tests/data/two_buildings.city.json";
const SCALE: f64 = 0.001;

fn all_lods() -> LoadOptions {
    LoadOptions {
        lods: vec![0, 1, 2, 3],
        ..LoadOptions::default()
    }
}

fn assert_same_city(a: &City, b: &City) {
    assert_eq!(a.buildings().len(), b.buildings().len());
    for (x, y) in a.buildings().iter().zip(b.buildings()) {
        assert_eq!(x.id(), y.id());
        assert_eq!(x.attributes(), y.attributes());
        assert_eq!(x.geometry().keys().collect::<Vec<_>>(), y.geometry().keys().collect::<Vec<_>>());
        for (ms_a, ms_b) in x.geometry().values().zip(y.geometry().values()) {
            assert_eq!(ms_a.semantics, ms_b.semantics);
            assert_eq!(ms_a.len(), ms_b.len());
            for (p, q) in ms_a.points().zip(ms_b.points()) {
                assert!((p.x - q.x).abs() <= SCALE && (p.y - q.y).abs() <= SCALE && (p.z - q.z).abs() <= SCALE);
            }
        }
        assert_eq!(
            x.parts().iter().map(|p| p.id()).collect::<Vec<_>>(),
            y.parts().iter().map(|p| p.id()).collect::<Vec<_>>()
        );
    }
}

#[test]
fn test_fixture_roundtrip() {
    let city = load_city_file_with(FIXTURE, &all_lods()).expect("Failed to load fixture");
    assert_eq!(city.buildings()[0].geometry().len(), 2, "LOD 1 and LOD 2 selected");

    let doc = city_to_cityjson(&city, SCALE).expect("Failed to serialize");
    let reloaded = assemble(&doc, &all_lods()).expect("Failed to reload");

    assert_same_city(&city, &reloaded);
    assert_eq!(
        city.terrain_mesh().map(|m| (m.vertex_count(), m.face_count())),
        reloaded.terrain_mesh().map(|m| (m.vertex_count(), m.face_count()))
    );
    // The unsupported tree is not written back
    assert!(reloaded.warnings().is_empty());
    println!("✓ Round-trip kept {} buildings", reloaded.buildings().len());
}

#[test]
fn test_shared_vertices_written_once() {
    let city = load_city_file_with(FIXTURE, &all_lods()).unwrap();
    let doc = city_to_cityjson(&city, SCALE).unwrap();
    let vertices = doc["vertices"].as_array().unwrap();

    // 8 cube corners, 4 for b2, 4 for the part, 4 for the terrain
    assert_eq!(vertices.len(), 20);
    assert_eq!(doc["CityObjects"]["b1-p1"]["parents"][0], "b1");
    assert_eq!(doc["CityObjects"]["b1"]["children"][0], "b1-p1");
    assert_eq!(doc["CityObjects"]["terrain"]["type"], "TINRelief");
}

#[test]
fn test_string_and_file_output() {
    let city = load_city_file_with(FIXTURE, &LoadOptions::default()).unwrap();

    let text = city_to_string(&city, SCALE).unwrap();
    let reloaded = parse_str(&text, &LoadOptions::default()).unwrap();
    assert_same_city(&city, &reloaded);

    std::fs::create_dir_all("output").unwrap();
    let output_path = "output/two_buildings_roundtrip.city.json";
    city_to_file(&city, output_path, SCALE).expect("Failed to write CityJSON");
    let file_size = std::fs::metadata(output_path).unwrap().len();
    assert!(file_size > 0, "Output file is empty");
}

#[test]
fn test_building_index_query() {
    let city = load_city_file_with(FIXTURE, &LoadOptions::default()).unwrap();
    let index = BuildingIndex::new(&city);
    assert_eq!(index.len(), 2);

    // b1 spans x 1000..1010, b2 spans x 1020..1030
    assert_eq!(index.query(&Bounds::new(1005.0, 2000.0, 1006.0, 2001.0)), vec![0]);
    assert_eq!(index.query(&Bounds::new(990.0, 1990.0, 1040.0, 2020.0)), vec![0, 1]);
    assert!(index.query(&Bounds::new(1012.0, 2000.0, 1018.0, 2005.0)).is_empty());
    assert_eq!(index.nearest(1029.0, 2005.0), Some(1));
}
