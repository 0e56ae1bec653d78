//! Hex paint editor binary.

use bevy::app::AppExit;
use bevy::prelude::*;
#[cfg(feature = "native")]
use bevy::remote::{RemotePlugin, http::RemoteHttpPlugin};
use bevy::winit::WinitSettings;
use bevy_inspector_egui::quick::WorldInspectorPlugin;

use hex_paint::EditorMode;
use hex_paint::editor::EditorPlugin;

#[cfg(feature = "native")]
mod cli {
    use std::path::PathBuf;

    use clap::Parser;

    use hex_paint::editor::EditorConfig;

    /// Interactive hex-grid paint editor.
    #[derive(Parser, Debug)]
    #[command(version, about)]
    pub struct Cli {
        /// Grid columns.
        #[arg(long, default_value_t = 100)]
        pub width: i32,
        /// Grid rows per column.
        #[arg(long, default_value_t = 100)]
        pub height: i32,
        /// Cell radius in world units.
        #[arg(long, default_value_t = 10.0)]
        pub scale: f64,
        /// JSON map merged into the grid at startup.
        #[arg(long)]
        pub import: Option<PathBuf>,
        /// Where "Save" writes and "Load" reads (defaults to the imported map).
        #[arg(long)]
        pub export: Option<PathBuf>,
        /// Where "Export SVG" writes.
        #[arg(long, default_value = "map.svg")]
        pub svg: PathBuf,
        /// Serve the Bevy remote protocol over HTTP.
        #[arg(long)]
        pub remote: bool,
    }

    impl Cli {
        pub fn config(&self) -> EditorConfig {
            let mut cfg = EditorConfig::default();
            cfg.grid.width = self.width;
            cfg.grid.height = self.height;
            cfg.grid.cell_radius = self.scale;
            cfg.files.import = self.import.clone();
            if let Some(path) = self.export.as_ref().or(self.import.as_ref()) {
                cfg.files.save_path = path.clone();
            }
            cfg.files.svg_path = self.svg.clone();
            cfg
        }
    }
}

fn main() {
    #[cfg(feature = "native")]
    let (config, remote) = {
        use clap::Parser;
        let cli = cli::Cli::parse();
        (cli.config(), cli.remote)
    };
    #[cfg(not(feature = "native"))]
    let config = hex_paint::editor::EditorConfig::default();

    let mut app = App::new();

    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: "Hex Paint".into(),
            ..default()
        }),
        ..default()
    }))
    .insert_resource(WinitSettings::desktop_app())
    .register_type::<EditorMode>()
    .init_state::<EditorMode>()
    .add_plugins(bevy_egui::EguiPlugin::default())
    .add_plugins(EditorPlugin(config))
    .add_systems(Update, exit_on_esc)
    .add_systems(Update, toggle_inspector)
    .add_plugins(WorldInspectorPlugin::new().run_if(in_state(EditorMode::Inspecting)));

    #[cfg(feature = "native")]
    if remote {
        app.add_plugins(RemotePlugin::default())
            .add_plugins(RemoteHttpPlugin::default());
    }

    app.run();
}

fn toggle_inspector(
    keys: Res<ButtonInput<KeyCode>>,
    state: Res<State<EditorMode>>,
    mut next: ResMut<NextState<EditorMode>>,
) {
    if keys.just_pressed(KeyCode::Tab) {
        next.set(match state.get() {
            EditorMode::Editing => EditorMode::Inspecting,
            EditorMode::Inspecting => EditorMode::Editing,
        });
    }
}

fn exit_on_esc(keys: Res<ButtonInput<KeyCode>>, mut exit: MessageWriter<AppExit>) {
    if keys.just_pressed(KeyCode::Escape) {
        exit.write(AppExit::Success);
    }
}
