use lectern::app::HeadlessApp;
use lectern::persistence::JsonStore;
use lectern::settings;
use std::sync::Arc;

fn main() {
    env_logger::init();

    let mut settings = settings::load_settings();
    let store = Arc::new(JsonStore::open_default());
    log::info!("Workspaces stored in {}", store.dir().display());

    let app = HeadlessApp::new(&settings, store);
    let workspace_id = app.workspace_id();
    if settings.active_workspace != Some(workspace_id) {
        settings.active_workspace = Some(workspace_id);
        if let Err(e) = settings::save_settings(&settings) {
            log::warn!("Failed to save settings: {}", e);
        }
    }

    app.run();
    print!("{}", app.layout_summary());
    app.shutdown();
}
