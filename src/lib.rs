pub mod builder;
pub mod commands;
pub mod db;
pub mod error;
pub mod logging;
pub mod metadata;
pub mod models;
pub mod replacement;
pub mod rotation;
pub mod segmenter;

use commands::AppState;
use db::Database;
use logging::LogState;
use std::sync::Mutex;
use tauri::Manager;

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    tauri::Builder::default()
        .plugin(tauri_plugin_fs::init())
        .setup(|app| {
            let log_state = LogState::new();
            log_state.init_log_dir();
            app.manage(log_state);

            let app_data_dir = app
                .path()
                .app_data_dir()
                .expect("failed to get app data dir");
            std::fs::create_dir_all(&app_data_dir).expect("failed to create app data dir");
            let db_path = app_data_dir.join("showplanner.db");

            let db = Database::new(db_path).expect("failed to initialize database");

            app.manage(AppState { db: Mutex::new(db) });
            Ok(())
        })
        .plugin(tauri_plugin_opener::init())
        .plugin(tauri_plugin_dialog::init())
        .invoke_handler(tauri::generate_handler![
            commands::get_songs,
            commands::get_song_availability,
            commands::stage_songs,
            commands::import_songs,
            commands::delete_song,
            commands::get_shows,
            commands::get_show,
            commands::get_show_segments,
            commands::create_show,
            commands::swap_show_playlist,
            commands::delete_show,
            commands::suggest_replacements,
            commands::replace_show_song,
            commands::reorder_show_song,
            commands::get_settings,
            commands::update_settings,
            logging::get_logs,
            logging::log_from_frontend,
            logging::get_debug_mode,
            logging::set_debug_mode
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
