use crate::app::state::MapStyle;
use clap::Parser;
use eframe_entrypoints::parse_args;

#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
/// Route Builder - Search places, order them by drag-and-drop and see the route on a map
pub struct Settings {
    /// Latitude the map starts at, also where unmatched places land before panning
    #[clap(long, default_value = "51.66082", allow_negative_numbers = true)]
    pub center_lat: f64,

    /// Longitude the map starts at
    #[clap(long, default_value = "39.200404", allow_negative_numbers = true)]
    pub center_lon: f64,

    /// Initial zoom level
    #[clap(long, default_value = "5")]
    pub zoom: f64,

    /// Map tiles provider [default: persisted choice or open-street-map]
    #[clap(long, value_enum)]
    pub map_style: Option<MapStyle>,

    /// Base URL of a Nominatim-compatible geocoding service
    #[clap(long, default_value = "https://nominatim.openstreetmap.org")]
    pub geocoder_url: String,

    /// User agent sent to the geocoding service (native only)
    #[clap(long, default_value = concat!("route-builder/", env!("CARGO_PKG_VERSION")))]
    pub user_agent: String,

    /// Seconds before a geocoding lookup is abandoned and the next one starts
    #[clap(long, default_value = "10")]
    pub geocode_timeout_secs: u64,

    /// Route line width in pixels [default: persisted value or 3.0]
    #[clap(long)]
    pub line_width: Option<f32>,

    /// Ignore previously persisted state and start fresh
    #[clap(long, default_value = "false")]
    pub ignore_persisted: bool,
}

impl Settings {
    /// Parse the command line (or URL on web), exiting on `--help` or bad input
    pub fn from_cli() -> Self {
        match parse_args::<Settings>() {
            Ok(args) => args,
            Err(e) => {
                #[cfg(not(target_arch = "wasm32"))]
                e.exit();
                #[cfg(target_arch = "wasm32")]
                {
                    let user_msg = format!(
                        "Error parsing CLI:\n{e}\n\nChange the GET params, using the cli prefix.\nStarting anyway without args."
                    );
                    if let Some(window) = web_sys::window() {
                        window.alert_with_message(&user_msg).unwrap_or(());
                    } else {
                        tracing::error!(user_msg);
                    }
                    Settings::parse_from(Vec::<String>::new())
                }
            }
        }
    }

    /// Initial map center as a walkers position
    pub fn home(&self) -> walkers::Position {
        walkers::lat_lon(self.center_lat, self.center_lon)
    }
}
