use fxmap::prelude::*;
use parking_lot::Mutex;
use std::time::Duration;

#[derive(Default)]
struct RecordingRenderer {
    scripts: Mutex<Vec<String>>,
    handles: Mutex<Vec<RendererHandle>>,
}

impl RecordingRenderer {
    fn scripts(&self) -> Vec<String> {
        self.scripts.lock().clone()
    }

    fn handle(&self, index: usize) -> RendererHandle {
        self.handles.lock()[index].clone()
    }
}

impl Renderer for RecordingRenderer {
    fn load(&self, _source: &MapSource, handle: RendererHandle) {
        self.handles.lock().push(handle);
    }

    fn execute(&self, script: &str) -> Option<serde_json::Value> {
        self.scripts.lock().push(script.to_string());
        None
    }
}

/// Loads on a worker thread: reports a viewport, then ready.
struct ThreadedRenderer {
    south_west: GeoPoint,
    north_east: GeoPoint,
}

impl Renderer for ThreadedRenderer {
    fn load(&self, _source: &MapSource, handle: RendererHandle) {
        let (south_west, north_east) = (self.south_west, self.north_east);
        std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(10));
            handle.zoom_changed(6.0);
            handle.bounds_changed(south_west, north_east);
            handle.ready();
        });
    }

    fn execute(&self, _script: &str) -> Option<serde_json::Value> {
        None
    }
}

fn ready_projection() -> (Arc<DefaultMapProjection>, Arc<RecordingRenderer>) {
    let _ = env_logger::builder().is_test(true).try_init();

    let projection = DefaultMapProjection::with_config(ProjectionConfig::continental_us()).unwrap();
    projection.set_screen_size(1280, 720);
    let renderer = Arc::new(RecordingRenderer::default());
    projection.initialize_bridge(renderer.clone());
    (projection, renderer)
}

#[test]
fn test_renderer_bounds_are_adopted_and_announced() {
    let (projection, renderer) = ready_projection();
    let seen = Arc::new(Mutex::new(Vec::new()));
    {
        let seen = Arc::clone(&seen);
        projection.add_event_listener(move |event| seen.lock().push(event.clone()));
    }
    let rx = projection.subscribe();

    let handle = renderer.handle(0);
    assert!(handle.bounds_changed(GeoPoint::new(30.0, -120.0), GeoPoint::new(45.0, -70.0)));

    let expected = GeoBoundary::new(-120.0, -70.0, 30.0, 45.0);
    assert_eq!(projection.bounds(), expected);
    assert_eq!(projection.x_ratio(), 50.0 / 1281.0);
    assert_eq!(projection.y_ratio(), 15.0 / 721.0);

    let event = ProjectionEvent::BoundsChanged {
        old: None,
        new: expected,
    };
    assert_eq!(*seen.lock(), vec![event.clone()]);
    assert_eq!(rx.try_recv().unwrap(), event);
}

#[test]
fn test_ready_marshals_bridge_state() {
    let (projection, renderer) = ready_projection();
    let rx = projection.subscribe();
    let handle = renderer.handle(0);

    handle.zoom_changed(5.0);
    handle.bounds_changed(GeoPoint::new(10.0, 20.0), GeoPoint::new(20.0, 40.0));
    assert!(handle.ready());

    assert_eq!(projection.zoom_level(), 5.0);
    assert_eq!(projection.bounds(), GeoBoundary::new(20.0, 40.0, 10.0, 20.0));

    let events: Vec<_> = rx.try_iter().collect();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].kind(), "bounds_changed");
    assert_eq!(
        events[1],
        ProjectionEvent::RendererReady {
            generation: handle.generation()
        }
    );
}

#[test]
fn test_stale_renderer_cannot_move_the_viewport() {
    let (projection, renderer) = ready_projection();
    let before = projection.bounds();
    let stale = renderer.handle(0);

    let rx = projection.subscribe();
    assert_eq!(
        projection.switch_map_source(MapSource::WebMap),
        MapSource::WebMap
    );

    assert!(!stale.bounds_changed(GeoPoint::new(-5.0, -5.0), GeoPoint::new(5.0, 5.0)));
    assert!(!stale.ready());
    assert_eq!(projection.bounds(), before);
    assert!(renderer.scripts().is_empty());

    assert_eq!(
        rx.try_iter().collect::<Vec<_>>(),
        vec![ProjectionEvent::SourceChanged {
            source: MapSource::WebMap
        }]
    );
}

#[test]
fn test_commands_issued_while_loading_reach_renderer_once_ready() {
    let (projection, renderer) = ready_projection();
    assert!(projection.zoom_in());
    projection.translate_center_in_pixel(0.0, 0.0);
    assert!(renderer.scripts().is_empty());

    renderer.handle(0).ready();
    assert_eq!(
        renderer.scripts(),
        vec![
            "document.boundsAndZoom()",
            "document.boundsAndZoom()",
            "document.panTo()"
        ]
    );

    // Once ready, commands are not queued any more.
    projection.set_pre_bounds(GeoBoundary::new(0.0, 2.0, 0.0, 2.0));
    assert_eq!(renderer.scripts().last().map(String::as_str), Some("document.panTo()"));
    assert_eq!(projection.bridge().center(), GeoPoint::new(1.0, 1.0));
    assert_eq!(projection.bridge().pending_commands(), 0);
}

#[test]
fn test_removed_listener_is_not_called() {
    let (projection, renderer) = ready_projection();
    let calls = Arc::new(Mutex::new(0));
    let id = {
        let calls = Arc::clone(&calls);
        projection.add_event_listener(move |_| *calls.lock() += 1)
    };

    renderer
        .handle(0)
        .bounds_changed(GeoPoint::new(0.0, 0.0), GeoPoint::new(1.0, 1.0));
    assert!(projection.remove_event_listener(id));
    renderer
        .handle(0)
        .bounds_changed(GeoPoint::new(0.0, 0.0), GeoPoint::new(2.0, 2.0));

    assert_eq!(*calls.lock(), 1);
    assert!(!projection.remove_event_listener(id));
}

#[test]
fn test_threaded_renderer_becomes_ready() {
    let projection = DefaultMapProjection::new();
    projection.set_screen_size(100, 100);
    let rx = projection.subscribe();

    let generation = projection.initialize_bridge(Arc::new(ThreadedRenderer {
        south_west: GeoPoint::new(-10.0, -10.0),
        north_east: GeoPoint::new(10.0, 10.0),
    }));

    let mut ready = None;
    while let Ok(event) = rx.recv_timeout(Duration::from_secs(5)) {
        if let ProjectionEvent::RendererReady { generation } = event {
            ready = Some(generation);
            break;
        }
    }

    assert_eq!(ready, Some(generation));
    assert!(projection.bridge().state().is_ready());
    assert_eq!(projection.zoom_level(), 6.0);
    assert_eq!(projection.bounds(), GeoBoundary::new(-10.0, 10.0, -10.0, 10.0));
    assert_eq!(projection.x_ratio(), 20.0 / 101.0);
}

#[test]
fn test_mercator_mode_ignores_anchors() {
    let projection = DefaultMapProjection::with_config(ProjectionConfig::mercator()).unwrap();
    projection.set_screen_size(800, 600);
    let before = projection.location_to_xy(48.8566, 2.3522);

    projection
        .set_bounds(GeoBoundary::new(-1.0, 1.0, -1.0, 1.0))
        .unwrap();
    assert_eq!(projection.location_to_xy(48.8566, 2.3522), before);

    projection.set_mode(ProjectionMode::Linear);
    assert_ne!(projection.location_to_xy(48.8566, 2.3522), before);
}

#[test]
fn test_dropping_projection_silences_renderer() {
    let (projection, renderer) = ready_projection();
    let handle = renderer.handle(0);
    drop(projection);

    assert!(!handle.is_current());
    assert!(!handle.ready());
    assert!(!handle.bounds_changed(GeoPoint::new(0.0, 0.0), GeoPoint::new(1.0, 1.0)));
}

#[test]
fn test_out_of_range_renderer_zoom_is_clamped() {
    let (projection, renderer) = ready_projection();
    let handle = renderer.handle(0);

    handle.zoom_changed(25.0);
    assert!(handle.ready());
    assert_eq!(projection.zoom_level(), 20.0);
    assert!(!projection.zoom_in());
    assert_eq!(projection.zoom_level(), 20.0);
    assert!(projection.zoom_out());
    assert_eq!(projection.zoom_level(), 19.0);

    handle.zoom_changed(1.0);
    handle.bounds_changed(GeoPoint::new(0.0, 0.0), GeoPoint::new(1.0, 1.0));
    assert_eq!(projection.zoom_level(), 3.0);
    assert!(!projection.zoom_out());
    assert_eq!(projection.zoom_level(), 3.0);
    assert!(projection.zoom_in());
    assert_eq!(projection.zoom_level(), 4.0);
}

#[test]
fn test_readers_never_see_torn_state() {
    use std::sync::atomic::{AtomicBool, Ordering};

    let projection = DefaultMapProjection::new();
    projection.set_screen_size(100, 100);
    let done = Arc::new(AtomicBool::new(false));

    let writer = {
        let projection = Arc::clone(&projection);
        let done = Arc::clone(&done);
        std::thread::spawn(move || {
            for i in 0..2000u32 {
                projection.set_screen_size(100 + i % 37, 50 + i % 91);
                let shift = f64::from(i % 53);
                projection
                    .set_bounds(GeoBoundary::new(
                        -100.0 + shift,
                        -60.0 + 2.0 * shift,
                        20.0 - shift / 2.0,
                        40.0 + shift,
                    ))
                    .unwrap();
            }
            done.store(true, Ordering::SeqCst);
        })
    };

    let mut snapshots = 0;
    while !done.load(Ordering::SeqCst) || snapshots == 0 {
        let state = projection.state();
        let (sw, ne) = (state.south_west, state.north_east);
        let x_ratio = (ne.lon - sw.lon).abs() / ((ne.x - sw.x).abs() + 1.0);
        let y_ratio = (sw.lat - ne.lat).abs() / ((sw.y - ne.y).abs() + 1.0);
        assert_eq!(state.x_ratio(), x_ratio);
        assert_eq!(state.y_ratio(), y_ratio);

        let p = projection.location_to_xy(30.0, -80.0);
        assert!(p.x.is_finite() && p.y.is_finite());
        assert!(projection.bounds().is_finite());
        snapshots += 1;
    }

    writer.join().unwrap();
    assert!(snapshots > 0);
}
