use distance_tracker::sdk::batch::{run_batch, BatchOptions, PairsConfig};
use distance_tracker::sdk::report::{write_report, ReportOutcome, COLUMNS};
use distance_tracker::sdk::routing::service::{Itinerary, Step, StepMode};
use distance_tracker::sdk::routing::{Coord, RouteCache, RouteResolver, StubProvider, TravelMode};
use std::fs;
use tempfile::tempdir;

fn itinerary(distance: &str, duration: &str, secs: u64, steps: Vec<(StepMode, u64)>) -> Itinerary {
    Itinerary {
        distance_text: distance.to_string(),
        duration_text: duration.to_string(),
        duration_secs: secs,
        steps: steps
            .into_iter()
            .map(|(mode, duration_secs)| Step {
                mode,
                duration_secs,
            })
            .collect(),
    }
}

fn provider() -> StubProvider {
    StubProvider::new()
        .with_geocode("A", Coord::new(40.7128, -74.006))
        .with_geocode("B", Coord::new(40.7306, -73.9352))
        .with_plus_code(Coord::new(40.7128, -74.006), "87G7PX7V+4H")
        .with_plus_code(Coord::new(40.7306, -73.9352), "87G8Q2JM+63")
        .with_directions(
            TravelMode::Driving,
            vec![itinerary("9.8 km", "21 mins", 1260, vec![])],
        )
        .with_directions(
            TravelMode::Transit,
            vec![
                // 30 + 2*15 + 10 = 70
                itinerary(
                    "11.0 km",
                    "30 mins",
                    1800,
                    vec![
                        (StepMode::Walking, 1200),
                        (StepMode::Transit, 300),
                        (StepMode::Transit, 300),
                    ],
                ),
                // 40 + 15 + 2.5 = 57.5
                itinerary(
                    "10.4 km",
                    "40 mins",
                    2400,
                    vec![(StepMode::Walking, 300), (StepMode::Transit, 2100)],
                ),
            ],
        )
        .with_directions(
            TravelMode::Bicycling,
            vec![itinerary("8.9 km", "33 mins", 1980, vec![])],
        )
}

fn pairs() -> PairsConfig {
    serde_json::from_str(
        r#"{
            "nyc": {
                "origins": [{"name": "Origin A", "location": "A"}],
                "destinations": [{"name": "Destination B", "location": "B"}]
            }
        }"#,
    )
    .unwrap()
}

#[test]
fn single_pair_produces_one_row() {
    let dir = tempdir().unwrap();
    let stub = provider();
    let cache = RouteCache::open(dir.path().join("cache")).unwrap();
    let mut resolver = RouteResolver::new(&stub, cache);

    let rows = run_batch(&pairs(), &BatchOptions::default(), &mut resolver).unwrap();

    assert_eq!(rows.len(), 1);
    let row = &rows[0];
    assert_eq!(row.pair_id, "nyc");
    assert_eq!(row.origin_name, "Origin A");
    assert_eq!(row.transit_hops, 1);
    assert_eq!(row.transit_duration, "40 mins");
    assert_eq!(row.biking_distance, "8.9 km");
    assert_eq!(row.driving_distance, "9.8 km");
    assert_eq!(row.origin_plus_code.as_deref(), Some("87G7PX7V+4H"));
    assert_eq!(row.destination_plus_code.as_deref(), Some("87G8Q2JM+63"));

    let output = dir.path().join("distances.csv");
    assert_eq!(write_report(&output, &rows).unwrap(), ReportOutcome::Created);

    let mut reader = csv::Reader::from_path(&output).unwrap();
    let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
    assert_eq!(headers, COLUMNS.to_vec());
    let records: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();
    assert_eq!(records.len(), 1);
    assert_eq!(&records[0][16], "1");
    assert_eq!(&records[0][18], "8.9 km");
}

#[test]
fn rerun_uses_cache_from_disk() {
    let dir = tempdir().unwrap();
    let cache_dir = dir.path().join("cache");

    let first = provider();
    let mut resolver = RouteResolver::new(&first, RouteCache::open(&cache_dir).unwrap());
    assert_eq!(
        run_batch(&pairs(), &BatchOptions::default(), &mut resolver)
            .unwrap()
            .len(),
        1
    );

    // A fresh process: same cache directory, new provider.
    let second = provider();
    let mut resolver = RouteResolver::new(&second, RouteCache::open(&cache_dir).unwrap());
    let rows = run_batch(&pairs(), &BatchOptions::default(), &mut resolver).unwrap();
    assert!(rows.is_empty());
    assert_eq!(second.call_count(), 0);

    let forced = BatchOptions {
        force: true,
        ..BatchOptions::default()
    };
    let rows = run_batch(&pairs(), &forced, &mut resolver).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(second.geocode_calls(), 0);
    assert_eq!(second.directions_requests().len(), 3);
}

#[test]
fn stale_cache_entry_is_recomputed() {
    let dir = tempdir().unwrap();
    let cache_dir = dir.path().join("cache");
    fs::create_dir_all(&cache_dir).unwrap();
    fs::write(
        cache_dir.join("route_cache.json"),
        r#"{
            "addr_A_addr_B_no_time": {
                "driving_distance": "1 km",
                "driving_duration": "1 min",
                "transit_distance": "1 km",
                "transit_duration": "5 mins",
                "transit_steps": 0,
                "origin_coords": {"lat": 40.7128, "lng": -74.006},
                "destination_coords": {"lat": 40.7306, "lng": -73.9352},
                "origin_plus_code": null,
                "destination_plus_code": null
            }
        }"#,
    )
    .unwrap();

    let stub = provider();
    let mut resolver = RouteResolver::new(&stub, RouteCache::open(&cache_dir).unwrap());
    let rows = run_batch(&pairs(), &BatchOptions::default(), &mut resolver).unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].biking_distance, "8.9 km");
    assert_eq!(rows[0].driving_distance, "9.8 km");
}
