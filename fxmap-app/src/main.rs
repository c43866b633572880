use anyhow::{bail, Context};
use crossbeam_channel::{unbounded, Receiver, Sender};
use fxmap::prelude::*;
use std::sync::Weak;
use std::thread;
use std::time::Duration;

/// Work handed to the simulated renderer thread
enum Job {
    Load(MapSource, RendererHandle),
    Script(String),
}

/// Stand-in for a web view: loads on its own thread and answers commands
/// asynchronously through the current load's handle.
struct SimulatedRenderer {
    jobs: Sender<Job>,
}

impl SimulatedRenderer {
    fn spawn(bridge: Weak<MapBridge>) -> Self {
        let (jobs, rx) = unbounded();
        thread::Builder::new()
            .name("simulated-renderer".to_string())
            .spawn(move || run_renderer(rx, bridge))
            .map(|_| ())
            .unwrap_or_else(|e| log::error!("failed to start renderer thread: {}", e));
        Self { jobs }
    }
}

impl Renderer for SimulatedRenderer {
    fn load(&self, source: &MapSource, handle: RendererHandle) {
        let _ = self.jobs.send(Job::Load(source.clone(), handle));
    }

    fn execute(&self, script: &str) -> Option<serde_json::Value> {
        let _ = self.jobs.send(Job::Script(script.to_string()));
        None
    }
}

fn run_renderer(jobs: Receiver<Job>, bridge: Weak<MapBridge>) {
    let mut current: Option<RendererHandle> = None;

    for job in jobs {
        match job {
            Job::Load(source, handle) => {
                log::info!("renderer loading page '{}'", source.page());
                thread::sleep(Duration::from_millis(50));
                let center = GeoPoint::new(39.5, -98.35);
                handle.center_changed(center);
                report_view(&handle, center, 4.0);
                handle.ready();
                current = Some(handle);
            }
            Job::Script(script) => {
                let (Some(handle), Some(bridge)) = (current.as_ref(), bridge.upgrade()) else {
                    continue;
                };
                log::debug!("renderer running {}", script);
                match RendererCommand::from(script) {
                    RendererCommand::PanTo => {
                        let center = bridge.center();
                        handle.center_changed(center);
                        report_view(handle, center, bridge.zoom_level());
                    }
                    RendererCommand::BoundsAndZoom => {
                        report_view(handle, bridge.center(), bridge.zoom_level());
                    }
                    RendererCommand::Script(other) => {
                        handle.report_error(format!("unsupported script {}", other));
                    }
                }
            }
        }
    }
}

/// Reports a viewport of 16:9 shape whose width halves with every zoom level
fn report_view(handle: &RendererHandle, center: GeoPoint, zoom: f64) {
    let half_width = 360.0 / 2_f64.powf(zoom) / 2.0;
    let half_height = half_width * 9.0 / 16.0;
    handle.zoom_changed(zoom);
    handle.bounds_changed(
        GeoPoint::new(center.lat - half_height, center.lon - half_width),
        GeoPoint::new(center.lat + half_height, center.lon + half_width),
    );
}

fn wait_for_ready(events: &Receiver<ProjectionEvent>, generation: Generation) -> anyhow::Result<()> {
    loop {
        let event = events
            .recv_timeout(Duration::from_secs(5))
            .context("renderer never became ready")?;
        log::info!("event: {:?}", event);
        if event == (ProjectionEvent::RendererReady { generation }) {
            return Ok(());
        }
    }
}

fn drain(events: &Receiver<ProjectionEvent>) {
    // Let the renderer thread answer whatever was just sent.
    thread::sleep(Duration::from_millis(100));
    for event in events.try_iter() {
        log::info!("event: {:?}", event);
    }
}

fn main() -> anyhow::Result<()> {
    fxmap::init_logging();

    let config = match std::env::args().nth(1) {
        Some(path) => {
            let json = std::fs::read_to_string(&path)
                .with_context(|| format!("reading config {}", path))?;
            ProjectionConfig::from_json(&json)?
        }
        None => ProjectionConfig::continental_us(),
    };

    let projection = DefaultMapProjection::with_config(config)?;
    projection.set_screen_size(1280, 720);
    let events = projection.subscribe();

    let renderer = SimulatedRenderer::spawn(Arc::downgrade(projection.bridge()));
    let generation = projection.initialize_bridge(Arc::new(renderer));
    wait_for_ready(&events, generation)?;
    println!("{}", projection);

    let point = projection.location_to_xy(37.7749, -122.4194);
    let back = projection.xy_to_location(point.x, point.y);
    println!("San Francisco -> ({:.1}, {:.1}) -> {}", point.x, point.y, back);

    if !projection.zoom_in() {
        bail!("zoom in refused at level {}", projection.zoom_level());
    }
    projection.translate_center_in_pixel(200.0, -100.0);
    drain(&events);
    println!("{}", projection);

    projection.switch_map_source(MapSource::WebMap);
    wait_for_ready(&events, projection.bridge().generation())?;
    println!("{}", projection);

    Ok(())
}
