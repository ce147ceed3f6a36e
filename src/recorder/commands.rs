use tauri::State;

use crate::recorder::state::{RecorderLayout, RecorderSnapshot};
use crate::recorder::RecorderController;
use crate::AppState;

fn controller_from_state(state: &State<'_, AppState>) -> RecorderController {
    state.recorder.clone()
}

#[tauri::command]
pub async fn get_recorder_state(state: State<'_, AppState>) -> Result<RecorderSnapshot, String> {
    let controller = controller_from_state(&state);
    Ok(controller.snapshot().await)
}

#[tauri::command]
pub async fn open_camera(state: State<'_, AppState>) -> Result<RecorderSnapshot, String> {
    let controller = controller_from_state(&state);
    controller.open_camera().await.map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn close_camera(state: State<'_, AppState>) -> Result<RecorderSnapshot, String> {
    let controller = controller_from_state(&state);
    controller.close_camera().await.map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn capture_checkpoint(state: State<'_, AppState>) -> Result<RecorderSnapshot, String> {
    let controller = controller_from_state(&state);
    controller
        .capture_checkpoint()
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn toggle_photo(
    state: State<'_, AppState>,
    index: usize,
) -> Result<RecorderSnapshot, String> {
    let controller = controller_from_state(&state);
    controller.toggle_photo(index).await.map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn set_layout(
    state: State<'_, AppState>,
    layout: RecorderLayout,
) -> Result<RecorderSnapshot, String> {
    let controller = controller_from_state(&state);
    controller.set_layout(layout).await.map_err(|e| e.to_string())
}
