pub mod camera;
pub mod config;
pub mod recorder;
pub mod snapshot;

use config::RecorderConfig;
use recorder::commands::{
    capture_checkpoint, close_camera, get_recorder_state, open_camera, set_layout, toggle_photo,
};
use recorder::RecorderController;
use tauri::Manager;

pub(crate) struct AppState {
    pub(crate) recorder: RecorderController,
}

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    // Initialize logging (reads RUST_LOG env var)
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    log::info!("punchclock starting up...");

    tauri::Builder::default()
        .plugin(tauri_plugin_opener::init())
        .setup(|app| {
            let config = RecorderConfig::from_env();
            let backend = config.camera_backend();
            let recorder = RecorderController::new(app.handle().clone(), backend, &config);

            app.manage(AppState { recorder });

            Ok(())
        })
        .on_window_event(|window, event| {
            // The recorder owns live camera hardware; window teardown
            // must release it synchronously.
            if let tauri::WindowEvent::Destroyed = event {
                let state = window.state::<AppState>();
                state.recorder.release_camera_blocking();
            }
        })
        .invoke_handler(tauri::generate_handler![
            get_recorder_state,
            open_camera,
            close_camera,
            capture_checkpoint,
            toggle_photo,
            set_layout,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
